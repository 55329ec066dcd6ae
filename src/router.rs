use crate::handlers::{
    health::health_check,
    login::{login_page, login_submit, logout},
    reports::{report_menu, report_menu_submit},
    users::{user_admin_page, user_admin_submit},
};
use crate::schemas::AppState;
use axum::{
    response::Redirect,
    routing::get,
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Login and logout
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        // Report menus, one page per category
        .route("/reports/:category", get(report_menu).post(report_menu_submit))
        // User administration
        .route("/admin/users", get(user_admin_page).post(user_admin_submit))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
