use sea_orm::entity::prelude::*;

/// Reserved group id that authorizes every device of the account.
pub const GROUP_ALL: &str = "all";
/// Form token for an empty group slot.
pub const GROUP_NONE: &str = "none";

/// Named collection of devices a user may be authorized to view.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "device_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
