use anyhow::Result;
use sea_orm::Database;
use std::sync::Arc;
use std::time::Duration;

use crate::schemas::AppState;
use crate::session::SessionStore;

/// Display capabilities and account-wide policies, read from the
/// environment once per process and treated as immutable afterwards.
#[derive(Clone, Debug)]
pub struct PortalConfig {
    /// Allow two users of one account to share a contact email.
    pub allow_duplicate_contact_email: bool,
    /// Number of authorized device-group slots on the edit form.
    pub authorized_group_count: usize,
    pub show_expiration: bool,
    pub show_address: bool,
    pub show_office_location: bool,
    pub show_notes: bool,
    pub show_preferred_device: bool,
    pub enable_csv_export: bool,
    pub enable_xml_export: bool,
    pub enable_xls_export: bool,
    /// Declared custom attribute keys accepted on the edit form.
    pub custom_attribute_keys: Vec<String>,
    /// Timezones offered by the report menu.
    pub timezones: Vec<String>,
    pub session_ttl_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            allow_duplicate_contact_email: false,
            authorized_group_count: 4,
            show_expiration: true,
            show_address: true,
            show_office_location: true,
            show_notes: true,
            show_preferred_device: true,
            enable_csv_export: true,
            enable_xml_export: true,
            enable_xls_export: false,
            custom_attribute_keys: Vec::new(),
            timezones: default_timezones(),
            session_ttl_secs: 3600,
        }
    }
}

impl PortalConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            allow_duplicate_contact_email: env_bool(
                "PORTAL_ALLOW_DUPLICATE_EMAIL",
                defaults.allow_duplicate_contact_email,
            ),
            authorized_group_count: env_usize(
                "PORTAL_AUTHORIZED_GROUP_COUNT",
                defaults.authorized_group_count,
            )
            .clamp(1, 10),
            show_expiration: env_bool("PORTAL_SHOW_EXPIRATION", defaults.show_expiration),
            show_address: env_bool("PORTAL_SHOW_ADDRESS", defaults.show_address),
            show_office_location: env_bool(
                "PORTAL_SHOW_OFFICE_LOCATION",
                defaults.show_office_location,
            ),
            show_notes: env_bool("PORTAL_SHOW_NOTES", defaults.show_notes),
            show_preferred_device: env_bool(
                "PORTAL_SHOW_PREFERRED_DEVICE",
                defaults.show_preferred_device,
            ),
            enable_csv_export: env_bool("PORTAL_ENABLE_CSV", defaults.enable_csv_export),
            enable_xml_export: env_bool("PORTAL_ENABLE_XML", defaults.enable_xml_export),
            enable_xls_export: env_bool("PORTAL_ENABLE_XLS", defaults.enable_xls_export),
            custom_attribute_keys: env_list("PORTAL_CUSTOM_ATTRIBUTE_KEYS"),
            timezones: {
                let list = env_list("PORTAL_TIMEZONES");
                if list.is_empty() {
                    defaults.timezones
                } else {
                    list
                }
            },
            session_ttl_secs: env_u64("PORTAL_SESSION_TTL_SECS", defaults.session_ttl_secs),
        }
    }
}

fn default_timezones() -> Vec<String> {
    [
        "UTC",
        "US/Eastern",
        "US/Central",
        "US/Mountain",
        "US/Pacific",
        "Europe/London",
        "Europe/Paris",
        "Europe/Prague",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Initialize application state against the given database URL.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    let config = PortalConfig::from_env();

    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));

    Ok(AppState {
        db,
        sessions,
        config: Arc::new(config),
    })
}
