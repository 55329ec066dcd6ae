use axum_test::{TestServer, TestServerConfig};
use migration::{Migrator, MigratorTrait};
use model::access::AccessLevel;
use model::entities::{
    account, device, device_group, driver, role, role_acl, user, user_acl,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::acl::{ACL_USER_ACLS, ACL_USER_ALL};
use crate::config::PortalConfig;
use crate::router::create_router;
use crate::schemas::AppState;
use crate::session::SessionStore;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Low-cost hash, test fixtures only.
pub fn test_hash(password: &str) -> String {
    bcrypt::hash(password, 4).expect("Failed to hash test password")
}

pub fn test_config() -> PortalConfig {
    PortalConfig {
        custom_attribute_keys: vec!["employeeid".to_string()],
        authorized_group_count: 3,
        ..PortalConfig::default()
    }
}

/// Create AppState for testing, seeded with two accounts:
///
/// - "demo" with users admin, dispatch, manager, legacy and retired
/// - "acme" with users boss and temp (and no admin user)
pub async fn setup_test_app_state() -> AppState {
    setup_test_app_state_with_config(test_config()).await
}

/// Same seeding, but with caller-chosen capability flags.
pub async fn setup_test_app_state_with_config(config: PortalConfig) -> AppState {
    let db = setup_test_db().await;
    seed(&db).await;

    AppState {
        db,
        sessions: SessionStore::new(Duration::from_secs(3600)),
        config: Arc::new(config),
    }
}

async fn seed(db: &DatabaseConnection) {
    account::ActiveModel {
        id: Set("demo".to_string()),
        description: Set("Demo Fleet".to_string()),
        is_active: Set(true),
        password: Set(test_hash("acctpass")),
        contact_email: Set("fleet@example.com".to_string()),
        timezone: Set("US/Pacific".to_string()),
        report_email: Set("reports@example.com".to_string()),
        smtp_enabled: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed demo account");

    user::ActiveModel {
        account_id: Set("demo".to_string()),
        user_id: Set("admin".to_string()),
        is_active: Set(true),
        description: Set("Account Administrator".to_string()),
        password: Set(test_hash("fleetpass")),
        contact_email: Set("fleet-admin@example.com".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed admin user");

    user::ActiveModel {
        account_id: Set("demo".to_string()),
        user_id: Set("dispatch".to_string()),
        is_active: Set(true),
        description: Set("Dispatcher".to_string()),
        password: Set(test_hash("dispatchpass")),
        role_id: Set("operators".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed dispatch user");

    user::ActiveModel {
        account_id: Set("demo".to_string()),
        user_id: Set("manager".to_string()),
        is_active: Set(true),
        description: Set("Fleet Manager".to_string()),
        password: Set(test_hash("managerpass")),
        contact_email: Set("manager@example.com".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed manager user");

    // A pre-existing row with an invalid stored contact email.
    user::ActiveModel {
        account_id: Set("demo".to_string()),
        user_id: Set("legacy".to_string()),
        is_active: Set(true),
        description: Set("Legacy Import".to_string()),
        contact_email: Set("bad-email".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed legacy user");

    user::ActiveModel {
        account_id: Set("demo".to_string()),
        user_id: Set("retired".to_string()),
        is_active: Set(true),
        description: Set("Former Employee".to_string()),
        password: Set(test_hash("retiredpass")),
        expires_at: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed retired user");

    role::ActiveModel {
        account_id: Set("demo".to_string()),
        role_id: Set("operators".to_string()),
        description: Set("Fleet operators".to_string()),
    }
    .insert(db)
    .await
    .expect("Failed to seed role");

    role_acl::ActiveModel {
        account_id: Set("demo".to_string()),
        role_id: Set("operators".to_string()),
        acl_id: Set("admin.users".to_string()),
        access_level: Set(AccessLevel::Write),
    }
    .insert(db)
    .await
    .expect("Failed to seed role acl");

    // Manager may administer every user and edit ACL overrides.
    user_acl::ActiveModel {
        account_id: Set("demo".to_string()),
        user_id: Set("manager".to_string()),
        acl_id: Set(ACL_USER_ALL.to_string()),
        access_level: Set(AccessLevel::All),
    }
    .insert(db)
    .await
    .expect("Failed to seed manager acl");
    user_acl::ActiveModel {
        account_id: Set("demo".to_string()),
        user_id: Set("manager".to_string()),
        acl_id: Set(ACL_USER_ACLS.to_string()),
        access_level: Set(AccessLevel::Write),
    }
    .insert(db)
    .await
    .expect("Failed to seed manager acl");

    for (group_id, description) in [("north", "Northern region"), ("south", "Southern region")] {
        device_group::ActiveModel {
            account_id: Set("demo".to_string()),
            group_id: Set(group_id.to_string()),
            description: Set(description.to_string()),
        }
        .insert(db)
        .await
        .expect("Failed to seed device group");
    }

    for device_id in ["van-1", "van-2"] {
        device::ActiveModel {
            account_id: Set("demo".to_string()),
            device_id: Set(device_id.to_string()),
            description: Set(device_id.to_uppercase()),
            is_active: Set(true),
        }
        .insert(db)
        .await
        .expect("Failed to seed device");
    }

    driver::ActiveModel {
        account_id: Set("demo".to_string()),
        driver_id: Set("jones".to_string()),
        description: Set("R. Jones".to_string()),
    }
    .insert(db)
    .await
    .expect("Failed to seed driver");

    // Second account with no admin user.
    account::ActiveModel {
        id: Set("acme".to_string()),
        description: Set("Acme Logistics".to_string()),
        is_active: Set(true),
        password: Set(test_hash("acmepass")),
        contact_email: Set("ops@acme.example".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed acme account");

    user::ActiveModel {
        account_id: Set("acme".to_string()),
        user_id: Set("boss".to_string()),
        is_active: Set(true),
        description: Set("Owner".to_string()),
        password: Set(test_hash("bosspass")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed boss user");

    user_acl::ActiveModel {
        account_id: Set("acme".to_string()),
        user_id: Set("boss".to_string()),
        acl_id: Set(ACL_USER_ALL.to_string()),
        access_level: Set(AccessLevel::All),
    }
    .insert(db)
    .await
    .expect("Failed to seed boss acl");

    user::ActiveModel {
        account_id: Set("acme".to_string()),
        user_id: Set("temp".to_string()),
        is_active: Set(true),
        description: Set("Temporary Hire".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed temp user");
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is determined by the RUST_LOG environment variable,
/// defaulting to WARN if not set.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create a cookie-keeping test server plus the state behind it.
pub async fn setup_test_server() -> (TestServer, AppState) {
    setup_test_server_with_config(test_config()).await
}

pub async fn setup_test_server_with_config(config: PortalConfig) -> (TestServer, AppState) {
    let _ = init_test_tracing();

    let state = setup_test_app_state_with_config(config).await;
    let router = create_router(state.clone());
    let config = TestServerConfig {
        save_cookies: true,
        ..Default::default()
    };
    let server = TestServer::new_with_config(router, config).expect("Failed to start test server");
    (server, state)
}
