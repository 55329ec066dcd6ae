use model::access::AccessLevel;
use model::entities::user::is_admin_user;
use model::entities::{prelude::*, role_acl, user, user_acl};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use std::collections::HashMap;

// ACL names gating the user administration page.
pub const ACL_USER_SELF: &str = "admin.users";
pub const ACL_USER_ALL: &str = "admin.users.all";
pub const ACL_USER_ACLS: &str = "admin.users.acls";
pub const ACL_USER_GROUPS: &str = "admin.users.groups";
pub const ACL_USER_ROLE: &str = "admin.users.role";
pub const ACL_USER_DEVICE: &str = "admin.users.device";

// ACL names gating the report menus.
pub const ACL_REPORT_DEVICE: &str = "reports.device";
pub const ACL_REPORT_GROUP: &str = "reports.group";
pub const ACL_REPORT_DRIVER: &str = "reports.driver";
pub const ACL_REPORT_TABLE: &str = "reports.table";
pub const ACL_REPORT_FORMAT: &str = "reports.format";

/// A named permission with its role-independent default and upper bound.
#[derive(Clone, Copy, Debug)]
pub struct AclEntry {
    pub name: &'static str,
    pub default_level: AccessLevel,
    pub max_level: AccessLevel,
}

/// Static catalog of every permission the portal evaluates. Never
/// mutated at request time.
pub const ACL_CATALOG: &[AclEntry] = &[
    AclEntry {
        name: ACL_USER_SELF,
        default_level: AccessLevel::Write,
        max_level: AccessLevel::All,
    },
    AclEntry {
        name: ACL_USER_ALL,
        default_level: AccessLevel::None,
        max_level: AccessLevel::All,
    },
    AclEntry {
        name: ACL_USER_ACLS,
        default_level: AccessLevel::None,
        max_level: AccessLevel::Write,
    },
    AclEntry {
        name: ACL_USER_GROUPS,
        default_level: AccessLevel::None,
        max_level: AccessLevel::Write,
    },
    AclEntry {
        name: ACL_USER_ROLE,
        default_level: AccessLevel::None,
        max_level: AccessLevel::Write,
    },
    AclEntry {
        name: ACL_USER_DEVICE,
        default_level: AccessLevel::Read,
        max_level: AccessLevel::Write,
    },
    AclEntry {
        name: ACL_REPORT_DEVICE,
        default_level: AccessLevel::Read,
        max_level: AccessLevel::Read,
    },
    AclEntry {
        name: ACL_REPORT_GROUP,
        default_level: AccessLevel::Read,
        max_level: AccessLevel::Read,
    },
    AclEntry {
        name: ACL_REPORT_DRIVER,
        default_level: AccessLevel::Read,
        max_level: AccessLevel::Read,
    },
    AclEntry {
        name: ACL_REPORT_TABLE,
        default_level: AccessLevel::Read,
        max_level: AccessLevel::Read,
    },
    AclEntry {
        name: ACL_REPORT_FORMAT,
        default_level: AccessLevel::Read,
        max_level: AccessLevel::Read,
    },
];

/// Look up a catalog entry by name.
pub fn acl_entry(name: &str) -> Option<&'static AclEntry> {
    ACL_CATALOG.iter().find(|e| e.name == name)
}

/// Catalog entries a user-level editor may override, in display order.
pub fn editable_acl_names() -> impl Iterator<Item = &'static str> {
    ACL_CATALOG.iter().map(|e| e.name)
}

/// Loaded ACL state for one user: per-user overrides and the role's
/// defaults, resolved against the static catalog on demand.
#[derive(Clone, Debug)]
pub struct AclContext {
    user_id: String,
    max_access_level: AccessLevel,
    overrides: HashMap<String, AccessLevel>,
    role_defaults: HashMap<String, AccessLevel>,
}

impl AclContext {
    /// Load the override and role rows for the given user.
    pub async fn load(db: &DatabaseConnection, user: &user::Model) -> Result<Self, DbErr> {
        let overrides = UserAcl::find()
            .filter(user_acl::Column::AccountId.eq(user.account_id.clone()))
            .filter(user_acl::Column::UserId.eq(user.user_id.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.acl_id, row.access_level))
            .collect();

        let role_defaults = if user.role_id.is_empty() {
            HashMap::new()
        } else {
            RoleAcl::find()
                .filter(role_acl::Column::AccountId.eq(user.account_id.clone()))
                .filter(role_acl::Column::RoleId.eq(user.role_id.clone()))
                .all(db)
                .await?
                .into_iter()
                .map(|row| (row.acl_id, row.access_level))
                .collect()
        };

        Ok(Self {
            user_id: user.user_id.clone(),
            max_access_level: user.max_access_level,
            overrides,
            role_defaults,
        })
    }

    /// Effective level for one permission name.
    ///
    /// The reserved admin user always evaluates to the entry maximum;
    /// its stored overrides are ignored. Everyone else resolves
    /// override, then role default, then catalog default, capped by the
    /// user's max access level and the entry maximum.
    pub fn access_level(&self, acl_name: &str) -> AccessLevel {
        let entry = match acl_entry(acl_name) {
            Some(entry) => entry,
            None => return AccessLevel::None,
        };
        if is_admin_user(&self.user_id) {
            return entry.max_level;
        }
        let level = self
            .overrides
            .get(acl_name)
            .or_else(|| self.role_defaults.get(acl_name))
            .copied()
            .unwrap_or(entry.default_level);
        level.min(self.max_access_level).min(entry.max_level)
    }

    /// The stored override for one permission, if any.
    pub fn override_level(&self, acl_name: &str) -> Option<AccessLevel> {
        self.overrides.get(acl_name).copied()
    }

    pub fn ok_read(&self, acl_name: &str) -> bool {
        self.access_level(acl_name).ok_read()
    }

    pub fn ok_write(&self, acl_name: &str) -> bool {
        self.access_level(acl_name).ok_write()
    }

    pub fn ok_all(&self, acl_name: &str) -> bool {
        self.access_level(acl_name).ok_all()
    }
}

/// Effective permission booleans for the user-admin page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessFlags {
    pub allow_new: bool,
    pub allow_delete: bool,
    pub allow_edit_all: bool,
    pub view_all: bool,
    pub edit_self: bool,
    pub view_self: bool,
    pub allow_edit: bool,
    pub allow_view: bool,
}

/// Derive the page-level permission booleans from the ACL context.
///
/// Pure; callers re-invoke it after writing ACL overrides so the same
/// response renders with the just-changed permissions.
pub fn compute_access_flags(acl: &AclContext) -> AccessFlags {
    let allow_new = acl.ok_all(ACL_USER_ALL);
    let allow_delete = allow_new;
    let allow_edit_all = allow_new || acl.ok_write(ACL_USER_ALL);
    let view_all = allow_edit_all || acl.ok_read(ACL_USER_ALL);
    let edit_self = allow_edit_all || acl.ok_write(ACL_USER_SELF);
    let view_self = edit_self || acl.ok_read(ACL_USER_SELF);
    let allow_edit = allow_edit_all || edit_self;
    let allow_view = allow_edit || view_all || view_self;
    AccessFlags {
        allow_new,
        allow_delete,
        allow_edit_all,
        view_all,
        edit_self,
        view_self,
        allow_edit,
        allow_view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(
        user_id: &str,
        max: AccessLevel,
        overrides: &[(&str, AccessLevel)],
        role_defaults: &[(&str, AccessLevel)],
    ) -> AclContext {
        AclContext {
            user_id: user_id.to_string(),
            max_access_level: max,
            overrides: overrides
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            role_defaults: role_defaults
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    #[test]
    fn admin_user_gets_entry_maximum() {
        let acl = context("admin", AccessLevel::None, &[(ACL_USER_ALL, AccessLevel::None)], &[]);
        assert_eq!(acl.access_level(ACL_USER_ALL), AccessLevel::All);
        assert_eq!(acl.access_level(ACL_USER_ACLS), AccessLevel::Write);
    }

    #[test]
    fn override_beats_role_default() {
        let acl = context(
            "dispatch",
            AccessLevel::All,
            &[(ACL_USER_ALL, AccessLevel::Read)],
            &[(ACL_USER_ALL, AccessLevel::All)],
        );
        assert_eq!(acl.access_level(ACL_USER_ALL), AccessLevel::Read);
    }

    #[test]
    fn role_default_beats_catalog_default() {
        let acl = context(
            "dispatch",
            AccessLevel::All,
            &[],
            &[(ACL_USER_ALL, AccessLevel::Write)],
        );
        assert_eq!(acl.access_level(ACL_USER_ALL), AccessLevel::Write);
    }

    #[test]
    fn max_access_level_caps_result() {
        let acl = context(
            "dispatch",
            AccessLevel::Read,
            &[(ACL_USER_ALL, AccessLevel::All)],
            &[],
        );
        assert_eq!(acl.access_level(ACL_USER_ALL), AccessLevel::Read);
    }

    #[test]
    fn unknown_acl_name_is_denied() {
        let acl = context("dispatch", AccessLevel::All, &[], &[]);
        assert_eq!(acl.access_level("no.such.acl"), AccessLevel::None);
    }

    #[test]
    fn flags_for_full_admin() {
        let acl = context("admin", AccessLevel::All, &[], &[]);
        let flags = compute_access_flags(&acl);
        assert!(flags.allow_new);
        assert!(flags.allow_delete);
        assert!(flags.allow_edit_all);
        assert!(flags.allow_view);
    }

    #[test]
    fn flags_for_self_editor() {
        // Write on the self ACL only: may edit itself, nothing else.
        let acl = context(
            "dispatch",
            AccessLevel::All,
            &[(ACL_USER_ALL, AccessLevel::None)],
            &[],
        );
        let flags = compute_access_flags(&acl);
        assert!(!flags.allow_new);
        assert!(!flags.allow_delete);
        assert!(!flags.allow_edit_all);
        assert!(!flags.view_all);
        assert!(flags.edit_self);
        assert!(flags.view_self);
        assert!(flags.allow_edit);
        assert!(flags.allow_view);
    }

    #[test]
    fn flags_for_read_only_viewer() {
        let acl = context(
            "dispatch",
            AccessLevel::Read,
            &[(ACL_USER_ALL, AccessLevel::Read)],
            &[],
        );
        let flags = compute_access_flags(&acl);
        assert!(!flags.allow_edit);
        assert!(flags.view_all);
        assert!(flags.view_self);
        assert!(flags.allow_view);
    }
}
