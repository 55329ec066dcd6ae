use sea_orm::entity::prelude::*;

use crate::access::AccessLevel;

/// Reserved user id that is always granted maximum access.
pub const ADMIN_USER_ID: &str = "admin";

/// A login within an account. Keyed by `(account_id, user_id)`.
///
/// Blank string fields mean "unset"; the portal renders and stores empty
/// strings rather than NULLs, matching the tracking platform's tables.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub is_active: bool,
    pub description: String,
    /// Bcrypt hash. Empty disables login for this user.
    pub password: String,
    /// JSON array of prior bcrypt hashes, consulted by the password policy.
    pub previous_passwords: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub notify_email: String,
    pub timezone: String,
    pub speed_units: String,
    pub distance_units: String,
    /// Page id shown right after login.
    pub first_login_page: String,
    /// Epoch seconds after which the login is refused, 0 = never expires.
    pub expires_at: i64,
    pub preferred_device_id: String,
    pub address_line1: String,
    pub address_city: String,
    pub address_state: String,
    pub office_location: String,
    pub notes: String,
    /// JSON object of declared custom attribute key/values.
    pub custom_attributes: String,
    /// Upper bound applied to every computed access level.
    pub max_access_level: AccessLevel,
    /// Role supplying default ACL levels; blank = no role.
    pub role_id: String,
    pub last_login_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user belongs to exactly one account.
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// True for the reserved account administrator id.
pub fn is_admin_user(user_id: &str) -> bool {
    user_id.eq_ignore_ascii_case(ADMIN_USER_ID)
}

impl Model {
    pub fn is_admin(&self) -> bool {
        is_admin_user(&self.user_id)
    }

    /// True once the expiration timestamp has passed.
    pub fn is_expired(&self, now_epoch: i64) -> bool {
        self.expires_at > 0 && self.expires_at < now_epoch
    }
}
