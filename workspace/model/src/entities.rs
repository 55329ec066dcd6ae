//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the fleet-tracking portal here.
//! The records mirror the account/user administration tables of the
//! tracking platform, adapted for Rust's type system and SeaORM.

pub mod account;
pub mod device;
pub mod device_group;
pub mod driver;
pub mod role;
pub mod role_acl;
pub mod user;
pub mod user_acl;
pub mod user_device_group;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::device::Entity as Device;
    pub use super::device_group::Entity as DeviceGroup;
    pub use super::driver::Entity as Driver;
    pub use super::role::Entity as Role;
    pub use super::role_acl::Entity as RoleAcl;
    pub use super::user::Entity as User;
    pub use super::user_acl::Entity as UserAcl;
    pub use super::user_device_group::Entity as UserDeviceGroup;
}

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use crate::access::AccessLevel;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let acct = account::ActiveModel {
            id: Set("demo".to_string()),
            description: Set("Demo Fleet".to_string()),
            is_active: Set(true),
            password: Set(String::new()),
            contact_email: Set("fleet@example.com".to_string()),
            timezone: Set("US/Pacific".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let admin = user::ActiveModel {
            account_id: Set("demo".to_string()),
            user_id: Set("admin".to_string()),
            is_active: Set(true),
            description: Set("Account Administrator".to_string()),
            max_access_level: Set(AccessLevel::All),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let operator = user::ActiveModel {
            account_id: Set("demo".to_string()),
            user_id: Set("dispatch".to_string()),
            is_active: Set(true),
            description: Set("Dispatcher".to_string()),
            role_id: Set("operators".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        role::ActiveModel {
            account_id: Set("demo".to_string()),
            role_id: Set("operators".to_string()),
            description: Set("Fleet operators".to_string()),
        }
        .insert(&db)
        .await?;

        role_acl::ActiveModel {
            account_id: Set("demo".to_string()),
            role_id: Set("operators".to_string()),
            acl_id: Set("admin.users".to_string()),
            access_level: Set(AccessLevel::Read),
        }
        .insert(&db)
        .await?;

        user_acl::ActiveModel {
            account_id: Set("demo".to_string()),
            user_id: Set("dispatch".to_string()),
            acl_id: Set("admin.users".to_string()),
            access_level: Set(AccessLevel::Write),
        }
        .insert(&db)
        .await?;

        device_group::ActiveModel {
            account_id: Set("demo".to_string()),
            group_id: Set("north".to_string()),
            description: Set("Northern region".to_string()),
        }
        .insert(&db)
        .await?;

        user_device_group::ActiveModel {
            account_id: Set("demo".to_string()),
            user_id: Set("dispatch".to_string()),
            seq: Set(0),
            group_id: Set("north".to_string()),
        }
        .insert(&db)
        .await?;

        // Read back and verify
        let users = User::find()
            .filter(user::Column::AccountId.eq("demo"))
            .all(&db)
            .await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.user_id == "admin"));
        assert!(users.iter().any(|u| u.user_id == "dispatch"));

        let found = User::find_by_id(("demo".to_string(), "dispatch".to_string()))
            .one(&db)
            .await?
            .expect("dispatch user exists");
        assert_eq!(found.role_id, "operators");

        let overrides = UserAcl::find()
            .filter(user_acl::Column::UserId.eq("dispatch"))
            .all(&db)
            .await?;
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].access_level, AccessLevel::Write);

        // Deleting a user cascades to its ACL overrides and group assignments
        operator.delete(&db).await?;
        let overrides = UserAcl::find()
            .filter(user_acl::Column::UserId.eq("dispatch"))
            .all(&db)
            .await?;
        assert!(overrides.is_empty());
        let assignments = UserDeviceGroup::find()
            .filter(user_device_group::Column::UserId.eq("dispatch"))
            .all(&db)
            .await?;
        assert!(assignments.is_empty());

        // Deleting an account cascades to its users
        acct.delete(&db).await?;
        let users = User::find().all(&db).await?;
        assert!(users.is_empty());
        let _ = admin;

        Ok(())
    }
}
