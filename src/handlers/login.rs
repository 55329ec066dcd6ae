use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use model::entities::prelude::*;
use model::entities::user::ADMIN_USER_ID;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, IntoActiveModel};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::PortalError;
use crate::pages::{render, LoginPage};
use crate::password::verify_password;
use crate::reports::resolve_timezone;
use crate::schemas::AppState;
use crate::session::{filter_id, SessionData, SESSION_COOKIE};

// One message for every login failure, so the form never reveals which
// part of the credentials was wrong.
const MSG_INVALID_LOGIN: &str = "Invalid account, user or password";

const PAGE_TITLE: &str = "Fleet Portal Login";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

/// Render the login form.
#[instrument(skip(_state))]
pub async fn login_page(State(_state): State<AppState>) -> Result<Response, PortalError> {
    let page = LoginPage {
        page_title: PAGE_TITLE.to_string(),
        alert: String::new(),
        account_id: String::new(),
        user_id: String::new(),
    };
    Ok(render(&page)?.into_response())
}

fn login_failed(account_id: &str, user_id: &str) -> Result<Response, PortalError> {
    let page = LoginPage {
        page_title: PAGE_TITLE.to_string(),
        alert: MSG_INVALID_LOGIN.to_string(),
        account_id: account_id.to_string(),
        user_id: user_id.to_string(),
    };
    Ok(render(&page)?.into_response())
}

/// Authenticate the submitted credentials and establish a session.
#[instrument(skip(state, jar, form))]
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PortalError> {
    let account_id = filter_id(&form.account);
    // A blank user means the account administrator.
    let user_id = {
        let filtered = filter_id(&form.user);
        if filtered.is_empty() {
            ADMIN_USER_ID.to_string()
        } else {
            filtered
        }
    };

    if account_id.is_empty() {
        return login_failed(&account_id, &user_id);
    }

    let account = match Account::find_by_id(account_id.clone()).one(&state.db).await? {
        Some(account) if account.is_active => account,
        _ => {
            debug!("login rejected: unknown or inactive account");
            return login_failed(&account_id, &user_id);
        }
    };

    let user = match User::find_by_id((account_id.clone(), user_id.clone()))
        .one(&state.db)
        .await?
    {
        Some(user) if user.is_active => user,
        _ => {
            debug!("login rejected: unknown or inactive user");
            return login_failed(&account_id, &user_id);
        }
    };

    let now = Utc::now().timestamp();
    if user.is_expired(now) {
        warn!("login rejected: expired user {}/{}", account_id, user_id);
        return login_failed(&account_id, &user_id);
    }

    if !verify_password(&form.password, &user.password) {
        debug!("login rejected: bad password");
        return login_failed(&account_id, &user_id);
    }

    // Record last-login times on both rows.
    let mut account_update = account.clone().into_active_model();
    account_update.last_login_at = Set(now);
    account_update.update(&state.db).await?;

    let mut user_update = user.clone().into_active_model();
    user_update.last_login_at = Set(now);
    user_update.update(&state.db).await?;

    let timezone = resolve_timezone(&state.config, "", "", &user.timezone, &account.timezone);
    let session_id = state
        .sessions
        .create(SessionData {
            account_id: account_id.clone(),
            user_id: user_id.clone(),
            timezone,
            ..Default::default()
        })
        .await;

    info!("login succeeded for {}/{}", account_id, user_id);
    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .build();
    Ok((jar.add(cookie), Redirect::to("/reports/device")).into_response())
}

/// Drop the session and return to the login form.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value()).await;
    }
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, Redirect::to("/login")).into_response()
}
