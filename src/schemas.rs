use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;

use crate::config::PortalConfig;
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Server-side session records, keyed by cookie id
    pub sessions: SessionStore,
    /// Process-wide capability flags and display options
    pub config: Arc<PortalConfig>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}
