use axum_extra::extract::cookie::CookieJar;
use model::entities::{account, prelude::*, user};
use moka::future::Cache;
use sea_orm::EntityTrait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::PortalError;
use crate::schemas::AppState;

/// Cookie carrying the opaque session id.
pub const SESSION_COOKIE: &str = "trackportal_session";

/// Server-side session record. All report-menu selections are kept here
/// as plain strings and overwritten on each submit.
#[derive(Clone, Debug, Default)]
pub struct SessionData {
    pub account_id: String,
    pub user_id: String,
    pub timezone: String,
    pub date_from: String,
    pub date_to: String,
    pub device_id: String,
    pub group_id: String,
    pub driver_id: String,
    pub report_limit: String,
    pub report_format: String,
}

/// Session records held in an in-process cache with a TTL; an evicted
/// session simply forces a fresh login.
#[derive(Clone, Debug)]
pub struct SessionStore {
    cache: Cache<String, SessionData>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Create a session and return its opaque id.
    pub async fn create(&self, data: SessionData) -> String {
        let id = Uuid::new_v4().to_string();
        self.cache.insert(id.clone(), data).await;
        id
    }

    pub async fn get(&self, id: &str) -> Option<SessionData> {
        self.cache.get(id).await
    }

    pub async fn update(&self, id: &str, data: SessionData) {
        self.cache.insert(id.to_string(), data).await;
    }

    pub async fn remove(&self, id: &str) {
        self.cache.invalidate(id).await;
    }
}

/// The authenticated requester: session record plus the freshly loaded
/// account and user rows.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub session_id: String,
    pub session: SessionData,
    pub account: account::Model,
    pub user: user::Model,
}

/// Resolve the session cookie to a live account/user pair.
///
/// Deactivated rows invalidate the session on the next request.
pub async fn authenticate(state: &AppState, jar: &CookieJar) -> Result<CurrentUser, PortalError> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(PortalError::NotLoggedIn)?;
    let session_id = cookie.value().to_string();
    let session = state
        .sessions
        .get(&session_id)
        .await
        .ok_or(PortalError::NotLoggedIn)?;

    let account = Account::find_by_id(session.account_id.clone())
        .one(&state.db)
        .await?
        .ok_or(PortalError::NotLoggedIn)?;
    let user = User::find_by_id((session.account_id.clone(), session.user_id.clone()))
        .one(&state.db)
        .await?
        .ok_or(PortalError::NotLoggedIn)?;

    if !account.is_active || !user.is_active {
        state.sessions.remove(&session_id).await;
        return Err(PortalError::NotLoggedIn);
    }

    Ok(CurrentUser {
        session_id,
        session,
        account,
        user,
    })
}

/// Normalize a submitted account/user/device id: trim, lowercase, and
/// keep only the characters the platform accepts in ids.
pub fn filter_id(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// True when the filtered id is acceptable as a new record key.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 32 && id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_id_strips_invalid_characters() {
        assert_eq!(filter_id("  Smith/Jones! "), "smithjones");
        assert_eq!(filter_id("Dispatch-01"), "dispatch-01");
        assert_eq!(filter_id("a.b_c"), "a.b_c");
    }

    #[test]
    fn id_validity() {
        assert!(is_valid_id("dispatch"));
        assert!(is_valid_id("d1"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id(".hidden"));
        assert!(!is_valid_id(&"x".repeat(40)));
    }

    #[tokio::test]
    async fn session_store_round_trip() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store
            .create(SessionData {
                account_id: "demo".into(),
                user_id: "admin".into(),
                ..Default::default()
            })
            .await;
        let session = store.get(&id).await.unwrap();
        assert_eq!(session.account_id, "demo");
        store.remove(&id).await;
        assert!(store.get(&id).await.is_none());
    }
}
