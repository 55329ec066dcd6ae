use sea_orm::entity::prelude::*;

/// Ordered authorized-group slot for a user.
///
/// A user with no rows here is unrestricted (sees all devices).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_device_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Slot position, 0-based.
    #[sea_orm(primary_key, auto_increment = false)]
    pub seq: i32,
    pub group_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
