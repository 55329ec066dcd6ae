use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(string(Accounts::Id).primary_key())
                    .col(string(Accounts::Description).default(""))
                    .col(boolean(Accounts::IsActive).default(true))
                    .col(string(Accounts::Password).default(""))
                    .col(string(Accounts::ContactEmail).default(""))
                    .col(string(Accounts::Timezone).default(""))
                    .col(string(Accounts::SpeedUnits).default("mph"))
                    .col(string(Accounts::DistanceUnits).default("miles"))
                    .col(string(Accounts::ReportEmail).default(""))
                    .col(boolean(Accounts::SmtpEnabled).default(false))
                    .col(big_integer(Accounts::LastLoginAt).default(0))
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string(Users::AccountId))
                    .col(string(Users::UserId))
                    .col(boolean(Users::IsActive).default(true))
                    .col(string(Users::Description).default(""))
                    .col(string(Users::Password).default(""))
                    .col(string(Users::PreviousPasswords).default("[]"))
                    .col(string(Users::ContactName).default(""))
                    .col(string(Users::ContactPhone).default(""))
                    .col(string(Users::ContactEmail).default(""))
                    .col(string(Users::NotifyEmail).default(""))
                    .col(string(Users::Timezone).default(""))
                    .col(string(Users::SpeedUnits).default(""))
                    .col(string(Users::DistanceUnits).default(""))
                    .col(string(Users::FirstLoginPage).default(""))
                    .col(big_integer(Users::ExpiresAt).default(0))
                    .col(string(Users::PreferredDeviceId).default(""))
                    .col(string(Users::AddressLine1).default(""))
                    .col(string(Users::AddressCity).default(""))
                    .col(string(Users::AddressState).default(""))
                    .col(string(Users::OfficeLocation).default(""))
                    .col(string(Users::Notes).default(""))
                    .col(string(Users::CustomAttributes).default("{}"))
                    .col(small_integer(Users::MaxAccessLevel).default(3))
                    .col(string(Users::RoleId).default(""))
                    .col(big_integer(Users::LastLoginAt).default(0))
                    .primary_key(
                        Index::create()
                            .name("pk_users")
                            .col(Users::AccountId)
                            .col(Users::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_account")
                            .from(Users::Table, Users::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_acls table
        manager
            .create_table(
                Table::create()
                    .table(UserAcls::Table)
                    .if_not_exists()
                    .col(string(UserAcls::AccountId))
                    .col(string(UserAcls::UserId))
                    .col(string(UserAcls::AclId))
                    .col(small_integer(UserAcls::AccessLevel).default(0))
                    .primary_key(
                        Index::create()
                            .name("pk_user_acls")
                            .col(UserAcls::AccountId)
                            .col(UserAcls::UserId)
                            .col(UserAcls::AclId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_acl_user")
                            .from(UserAcls::Table, (UserAcls::AccountId, UserAcls::UserId))
                            .to(Users::Table, (Users::AccountId, Users::UserId))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create roles table
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(string(Roles::AccountId))
                    .col(string(Roles::RoleId))
                    .col(string(Roles::Description).default(""))
                    .primary_key(
                        Index::create()
                            .name("pk_roles")
                            .col(Roles::AccountId)
                            .col(Roles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_account")
                            .from(Roles::Table, Roles::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create role_acls table
        manager
            .create_table(
                Table::create()
                    .table(RoleAcls::Table)
                    .if_not_exists()
                    .col(string(RoleAcls::AccountId))
                    .col(string(RoleAcls::RoleId))
                    .col(string(RoleAcls::AclId))
                    .col(small_integer(RoleAcls::AccessLevel).default(0))
                    .primary_key(
                        Index::create()
                            .name("pk_role_acls")
                            .col(RoleAcls::AccountId)
                            .col(RoleAcls::RoleId)
                            .col(RoleAcls::AclId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_acl_role")
                            .from(RoleAcls::Table, (RoleAcls::AccountId, RoleAcls::RoleId))
                            .to(Roles::Table, (Roles::AccountId, Roles::RoleId))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create devices table
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(string(Devices::AccountId))
                    .col(string(Devices::DeviceId))
                    .col(string(Devices::Description).default(""))
                    .col(boolean(Devices::IsActive).default(true))
                    .primary_key(
                        Index::create()
                            .name("pk_devices")
                            .col(Devices::AccountId)
                            .col(Devices::DeviceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_account")
                            .from(Devices::Table, Devices::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create device_groups table
        manager
            .create_table(
                Table::create()
                    .table(DeviceGroups::Table)
                    .if_not_exists()
                    .col(string(DeviceGroups::AccountId))
                    .col(string(DeviceGroups::GroupId))
                    .col(string(DeviceGroups::Description).default(""))
                    .primary_key(
                        Index::create()
                            .name("pk_device_groups")
                            .col(DeviceGroups::AccountId)
                            .col(DeviceGroups::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_group_account")
                            .from(DeviceGroups::Table, DeviceGroups::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_device_groups table (join table)
        manager
            .create_table(
                Table::create()
                    .table(UserDeviceGroups::Table)
                    .if_not_exists()
                    .col(string(UserDeviceGroups::AccountId))
                    .col(string(UserDeviceGroups::UserId))
                    .col(integer(UserDeviceGroups::Seq))
                    .col(string(UserDeviceGroups::GroupId).default(""))
                    .primary_key(
                        Index::create()
                            .name("pk_user_device_groups")
                            .col(UserDeviceGroups::AccountId)
                            .col(UserDeviceGroups::UserId)
                            .col(UserDeviceGroups::Seq),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_device_group_user")
                            .from(
                                UserDeviceGroups::Table,
                                (UserDeviceGroups::AccountId, UserDeviceGroups::UserId),
                            )
                            .to(Users::Table, (Users::AccountId, Users::UserId))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create drivers table
        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(string(Drivers::AccountId))
                    .col(string(Drivers::DriverId))
                    .col(string(Drivers::Description).default(""))
                    .primary_key(
                        Index::create()
                            .name("pk_drivers")
                            .col(Drivers::AccountId)
                            .col(Drivers::DriverId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_account")
                            .from(Drivers::Table, Drivers::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Drivers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserDeviceGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleAcls::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAcls::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Description,
    IsActive,
    Password,
    ContactEmail,
    Timezone,
    SpeedUnits,
    DistanceUnits,
    ReportEmail,
    SmtpEnabled,
    LastLoginAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    AccountId,
    UserId,
    IsActive,
    Description,
    Password,
    PreviousPasswords,
    ContactName,
    ContactPhone,
    ContactEmail,
    NotifyEmail,
    Timezone,
    SpeedUnits,
    DistanceUnits,
    FirstLoginPage,
    ExpiresAt,
    PreferredDeviceId,
    AddressLine1,
    AddressCity,
    AddressState,
    OfficeLocation,
    Notes,
    CustomAttributes,
    MaxAccessLevel,
    RoleId,
    LastLoginAt,
}

#[derive(DeriveIden)]
enum UserAcls {
    Table,
    AccountId,
    UserId,
    AclId,
    AccessLevel,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    AccountId,
    RoleId,
    Description,
}

#[derive(DeriveIden)]
enum RoleAcls {
    Table,
    AccountId,
    RoleId,
    AclId,
    AccessLevel,
}

#[derive(DeriveIden)]
enum Devices {
    Table,
    AccountId,
    DeviceId,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum DeviceGroups {
    Table,
    AccountId,
    GroupId,
    Description,
}

#[derive(DeriveIden)]
enum UserDeviceGroups {
    Table,
    AccountId,
    UserId,
    Seq,
    GroupId,
}

#[derive(DeriveIden)]
enum Drivers {
    Table,
    AccountId,
    DriverId,
    Description,
}
