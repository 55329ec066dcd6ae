use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::error;

/// Request-scoped portal errors.
///
/// Validation problems are not represented here; they re-render the form
/// with a message. This enum covers the failures that abort the page.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("access denied")]
    AccessDenied,
    #[error("page not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Template(#[from] askama::Error),
    #[error(transparent)]
    Password(#[from] bcrypt::BcryptError),
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        match self {
            PortalError::NotLoggedIn => Redirect::to("/login").into_response(),
            PortalError::AccessDenied => {
                (StatusCode::FORBIDDEN, "Access denied").into_response()
            }
            PortalError::NotFound => {
                (StatusCode::NOT_FOUND, "Page not found").into_response()
            }
            PortalError::Database(e) => {
                error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error has occurred")
                    .into_response()
            }
            PortalError::Template(e) => {
                error!("template error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error has occurred")
                    .into_response()
            }
            PortalError::Password(e) => {
                error!("password hashing error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error has occurred")
                    .into_response()
            }
        }
    }
}
