use sea_orm::entity::prelude::*;

/// Tenant-level record that owns the users, devices and groups of a fleet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Account id, the tenant key. Lowercase, filtered on entry.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub is_active: bool,
    /// Bcrypt hash of the account ("admin") password. Empty disables login.
    pub password: String,
    pub contact_email: String,
    /// Default timezone for users that have none of their own.
    pub timezone: String,
    pub speed_units: String,
    pub distance_units: String,
    /// "From" address used for emailed reports. Blank disables the option.
    pub report_email: String,
    pub smtp_enabled: bool,
    /// Epoch seconds of the last successful login, 0 if never.
    pub last_login_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An account owns zero-or-more users.
    #[sea_orm(has_many = "super::user::Entity")]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
