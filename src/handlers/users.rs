use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, NaiveDate, NaiveTime};
use model::access::AccessLevel;
use model::entities::device_group::GROUP_NONE;
use model::entities::user::{is_admin_user, ADMIN_USER_ID};
use model::entities::{
    device_group, prelude::*, role, user, user_acl, user_device_group,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use validator::ValidateEmail;

use crate::acl::{
    compute_access_flags, editable_acl_names, AccessFlags, AclContext, ACL_USER_ACLS,
    ACL_USER_DEVICE, ACL_USER_GROUPS, ACL_USER_ROLE,
};
use crate::error::PortalError;
use crate::pages::{
    render, yes_no_items, ComboItem, ComboRow, FieldRow, UserEditPage, UserListPage, UserRow,
};
use crate::password::{
    decode_password_history, hash_password, push_password_history, verify_password,
    PasswordPolicy, PASSWORD_HOLDER,
};
use crate::schemas::AppState;
use crate::session::{authenticate, filter_id, is_valid_id, CurrentUser};

const PAGE_TITLE: &str = "User Administration";

const MSG_USER_UPDATED: &str = "User information updated";
const MSG_USER_CREATED: &str = "New user created";
const MSG_USER_DELETED: &str = "User deleted";
const MSG_SELECT_USER: &str = "Please select a user";
const MSG_CANNOT_DELETE_CURRENT: &str = "Cannot delete current user";
const MSG_INVALID_ID: &str = "Invalid user ID";
const MSG_ID_EXISTS: &str = "User ID already exists";
const MSG_INVALID_EMAIL: &str = "Invalid contact email address";
const MSG_DUPLICATE_EMAIL: &str = "Contact email address is already in use";
const MSG_INVALID_NOTIFY: &str = "Invalid notify email address";
const MSG_INVALID_ROLE: &str = "Invalid role";
const MSG_INVALID_GROUP: &str = "Invalid device group";

/// Expiration strings exchanged with the edit form.
const EXPIRATION_FORMAT: &str = "%Y/%m/%d,%H:%M:%S";

/// Which page the request resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    List,
    View,
    Edit,
    New,
    Update,
    Delete,
}

fn resolve_command(params: &HashMap<String, String>) -> Command {
    if params.contains_key("u_subnew") {
        Command::New
    } else if params.contains_key("u_subdel") {
        Command::Delete
    } else if params.contains_key("u_subchg") {
        Command::Update
    } else if params.contains_key("u_subedit") {
        Command::Edit
    } else if params.contains_key("u_subview") {
        Command::View
    } else {
        Command::List
    }
}

/// User admin page via plain navigation.
#[instrument(skip(state, jar, params))]
pub async fn user_admin_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, PortalError> {
    handle(&state, &jar, &params).await
}

/// User admin form submit.
#[instrument(skip(state, jar, params))]
pub async fn user_admin_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Response, PortalError> {
    handle(&state, &jar, &params).await
}

/// What the request renders after command handling.
enum Outcome {
    List,
    Form { user: user::Model, read_only: bool },
}

/// Result of the update validation pass.
enum SaveResult {
    Saved,
    Rejected(String),
}

async fn handle(
    state: &AppState,
    jar: &CookieJar,
    params: &HashMap<String, String>,
) -> Result<Response, PortalError> {
    let current = authenticate(state, jar).await?;
    let acl = AclContext::load(&state.db, &current.user).await?;
    let mut flags = compute_access_flags(&acl);
    if !flags.allow_view {
        return Err(PortalError::AccessDenied);
    }

    let mut alert = String::new();
    let mut selected_id = params.get("u_user").map(|v| filter_id(v)).unwrap_or_default();
    let selected = if selected_id.is_empty() {
        None
    } else {
        find_user(state, &current.account.id, &selected_id).await?
    };

    let command = resolve_command(params);
    debug!("user admin command {:?} selected '{}'", command, selected_id);

    let outcome = match command {
        Command::List => Outcome::List,
        Command::View => match selected {
            // Authorization failures fall through to the list view.
            Some(user) if may_view(&flags, &current, &user) => Outcome::Form {
                user,
                read_only: true,
            },
            _ => Outcome::List,
        },
        Command::Edit => match selected {
            Some(user) if may_edit(&flags, &current, &user) => Outcome::Form {
                user,
                read_only: false,
            },
            _ => Outcome::List,
        },
        Command::New => {
            if flags.allow_new {
                let raw = params.get("u_newid").map(String::as_str).unwrap_or("");
                match create_user(state, &current, raw).await? {
                    Ok(new_id) => {
                        alert = MSG_USER_CREATED.to_string();
                        selected_id = new_id;
                    }
                    Err(msg) => alert = msg,
                }
            }
            Outcome::List
        }
        Command::Delete => {
            if flags.allow_delete {
                match selected {
                    None => alert = MSG_SELECT_USER.to_string(),
                    Some(user) if user.user_id == current.user.user_id => {
                        warn!("self-delete rejected for {}", user.user_id);
                        alert = MSG_CANNOT_DELETE_CURRENT.to_string();
                    }
                    Some(user) => {
                        delete_user(state, &user).await?;
                        info!("deleted user {}/{}", user.account_id, user.user_id);
                        alert = MSG_USER_DELETED.to_string();
                        // Re-select the first remaining non-current user,
                        // or nothing when none is left.
                        let remaining = list_users(state, &current, &flags).await?;
                        selected_id = remaining
                            .iter()
                            .map(|u| u.user_id.clone())
                            .find(|id| *id != current.user.user_id)
                            .unwrap_or_default();
                    }
                }
            }
            Outcome::List
        }
        Command::Update => match selected {
            Some(user) if may_edit(&flags, &current, &user) => {
                match apply_update(state, &current, &acl, &user, params).await? {
                    SaveResult::Saved => {
                        // Permissions may have just changed; recompute so
                        // this very response renders with the new flags.
                        if user.user_id == current.user.user_id {
                            if let Some(reloaded) =
                                find_user(state, &current.account.id, &user.user_id).await?
                            {
                                let acl = AclContext::load(&state.db, &reloaded).await?;
                                flags = compute_access_flags(&acl);
                            }
                        }
                        alert = MSG_USER_UPDATED.to_string();
                        Outcome::List
                    }
                    SaveResult::Rejected(msg) => {
                        debug!("update rejected: {}", msg);
                        alert = msg;
                        Outcome::Form {
                            user,
                            read_only: false,
                        }
                    }
                }
            }
            _ => Outcome::List,
        },
    };

    match outcome {
        Outcome::List => render_list(state, &current, &flags, &selected_id, alert).await,
        Outcome::Form { user, read_only } => {
            render_form(state, &current, &acl, &user, read_only, alert).await
        }
    }
}

fn may_view(flags: &AccessFlags, current: &CurrentUser, user: &user::Model) -> bool {
    if user.user_id == current.user.user_id {
        flags.view_self || flags.view_all
    } else {
        flags.view_all
    }
}

fn may_edit(flags: &AccessFlags, current: &CurrentUser, user: &user::Model) -> bool {
    if user.user_id == current.user.user_id {
        flags.edit_self || flags.allow_edit_all
    } else {
        flags.allow_edit_all
    }
}

async fn find_user(
    state: &AppState,
    account_id: &str,
    user_id: &str,
) -> Result<Option<user::Model>, PortalError> {
    Ok(User::find_by_id((account_id.to_string(), user_id.to_string()))
        .one(&state.db)
        .await?)
}

async fn list_users(
    state: &AppState,
    current: &CurrentUser,
    flags: &AccessFlags,
) -> Result<Vec<user::Model>, PortalError> {
    if flags.view_all {
        Ok(User::find()
            .filter(user::Column::AccountId.eq(current.account.id.clone()))
            .order_by_asc(user::Column::UserId)
            .all(&state.db)
            .await?)
    } else {
        Ok(vec![current.user.clone()])
    }
}

async fn create_user(
    state: &AppState,
    current: &CurrentUser,
    raw_id: &str,
) -> Result<Result<String, String>, PortalError> {
    let new_id = filter_id(raw_id);
    if !is_valid_id(&new_id) {
        return Ok(Err(MSG_INVALID_ID.to_string()));
    }
    if find_user(state, &current.account.id, &new_id).await?.is_some() {
        return Ok(Err(MSG_ID_EXISTS.to_string()));
    }
    // The reserved admin id may only be created while the account has no
    // admin user.
    let is_admin = is_admin_user(&new_id);
    if is_admin
        && find_user(state, &current.account.id, ADMIN_USER_ID)
            .await?
            .is_some()
    {
        return Ok(Err(MSG_ID_EXISTS.to_string()));
    }

    // The admin user inherits the account's contact email and password.
    let (password, contact_email) = if is_admin {
        (
            current.account.password.clone(),
            current.account.contact_email.clone(),
        )
    } else {
        (String::new(), String::new())
    };

    user::ActiveModel {
        account_id: Set(current.account.id.clone()),
        user_id: Set(new_id.clone()),
        is_active: Set(true),
        description: Set(new_id.clone()),
        password: Set(password),
        contact_email: Set(contact_email),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("created user {}/{}", current.account.id, new_id);
    Ok(Ok(new_id))
}

async fn delete_user(state: &AppState, user: &user::Model) -> Result<(), PortalError> {
    // Dependent rows first; the schema cascades as well, but sqlite
    // deployments do not always enforce foreign keys.
    UserAcl::delete_many()
        .filter(user_acl::Column::AccountId.eq(user.account_id.clone()))
        .filter(user_acl::Column::UserId.eq(user.user_id.clone()))
        .exec(&state.db)
        .await?;
    UserDeviceGroup::delete_many()
        .filter(user_device_group::Column::AccountId.eq(user.account_id.clone()))
        .filter(user_device_group::Column::UserId.eq(user.user_id.clone()))
        .exec(&state.db)
        .await?;
    User::delete_by_id((user.account_id.clone(), user.user_id.clone()))
        .exec(&state.db)
        .await?;
    Ok(())
}

fn parse_expiration(value: &str) -> Option<i64> {
    // "yyyy/MM/dd,HH:mm:ss,z"; the trailing timezone token is ignored.
    let mut parts = value.split(',');
    let date = NaiveDate::parse_from_str(parts.next()?.trim(), "%Y/%m/%d").ok()?;
    let time = match parts.next() {
        Some(t) => NaiveTime::parse_from_str(t.trim(), "%H:%M:%S").ok()?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time).and_utc().timestamp())
}

fn format_expiration(epoch: i64) -> String {
    if epoch <= 0 {
        return String::new();
    }
    match DateTime::from_timestamp(epoch, 0) {
        Some(ts) => format!("{},UTC", ts.format(EXPIRATION_FORMAT)),
        None => String::new(),
    }
}

/// Validate every submitted field in order, then persist: the user row
/// exactly once, followed by group assignments and ACL overrides. Any
/// validation failure returns before the first write.
async fn apply_update(
    state: &AppState,
    current: &CurrentUser,
    acl: &AclContext,
    selected: &user::Model,
    params: &HashMap<String, String>,
) -> Result<SaveResult, PortalError> {
    let config = &state.config;
    let policy = PasswordPolicy::default();
    let is_self = selected.user_id == current.user.user_id;
    let mut active = selected.clone().into_active_model();
    let mut pending_groups: Option<Vec<String>> = None;
    let mut pending_acls: Vec<(&'static str, Option<AccessLevel>)> = Vec::new();

    // Active flag; the current user is always forced active.
    if let Some(value) = params.get("u_actv") {
        active.is_active = Set(is_self || value == "yes");
    }

    // Password: blank or the masked placeholder leaves it alone, and so
    // does resubmitting the current password.
    if let Some(value) = params.get("u_pass") {
        let candidate = value.trim();
        if !candidate.is_empty()
            && candidate != PASSWORD_HOLDER
            && !verify_password(candidate, &selected.password)
        {
            let history = decode_password_history(&selected.previous_passwords);
            if let Err(msg) = policy.validate_new_password(candidate, &history) {
                return Ok(SaveResult::Rejected(msg));
            }
            let hash = hash_password(candidate)?;
            if !selected.password.is_empty() {
                active.previous_passwords = Set(push_password_history(
                    &history,
                    &selected.password,
                    policy.history_depth,
                ));
            }
            active.password = Set(hash);
        }
    }

    // Description is only replaced by a non-blank value.
    if let Some(value) = params.get("u_name") {
        let value = value.trim();
        if !value.is_empty() {
            active.description = Set(value.to_string());
        }
    }

    if let Some(value) = params.get("u_contact") {
        active.contact_name = Set(value.trim().to_string());
    }
    if let Some(value) = params.get("u_phone") {
        active.contact_phone = Set(value.trim().to_string());
    }

    // Contact email: an unchanged value skips validation entirely.
    if let Some(value) = params.get("u_email") {
        let value = value.trim().to_string();
        if value != selected.contact_email {
            if !value.is_empty() {
                if !value.validate_email() {
                    return Ok(SaveResult::Rejected(MSG_INVALID_EMAIL.to_string()));
                }
                if !config.allow_duplicate_contact_email {
                    let duplicate = User::find()
                        .filter(user::Column::AccountId.eq(selected.account_id.clone()))
                        .filter(user::Column::ContactEmail.eq(value.clone()))
                        .filter(user::Column::UserId.ne(selected.user_id.clone()))
                        .one(&state.db)
                        .await?;
                    if duplicate.is_some() {
                        return Ok(SaveResult::Rejected(MSG_DUPLICATE_EMAIL.to_string()));
                    }
                }
            }
            active.contact_email = Set(value);
        }
    }

    // Notify email is only editable on SMTP-enabled accounts.
    if current.account.smtp_enabled {
        if let Some(value) = params.get("u_notify") {
            let value = value.trim().to_string();
            if !value.is_empty() && !value.validate_email() {
                return Ok(SaveResult::Rejected(MSG_INVALID_NOTIFY.to_string()));
            }
            active.notify_email = Set(value);
        }
    }

    // Timezone: blank or unknown falls back to UTC.
    if let Some(value) = params.get("u_tmz") {
        let value = value.trim();
        let timezone = if config.timezones.iter().any(|tz| tz == value) {
            value.to_string()
        } else {
            "UTC".to_string()
        };
        active.timezone = Set(timezone);
    }

    if let Some(value) = params.get("u_spdun") {
        active.speed_units = Set(value.trim().to_lowercase());
    }
    if let Some(value) = params.get("u_dstun") {
        active.distance_units = Set(value.trim().to_lowercase());
    }
    if let Some(value) = params.get("u_1stpage") {
        active.first_login_page = Set(value.trim().to_string());
    }

    // Expiration: only the account administrator sets it; blank clears,
    // an unparseable value leaves the stored time unchanged.
    if config.show_expiration && current.user.is_admin() {
        if let Some(value) = params.get("u_xpire") {
            let value = value.trim();
            if value.is_empty() {
                active.expires_at = Set(0);
            } else if let Some(epoch) = parse_expiration(value) {
                active.expires_at = Set(epoch);
            }
        }
    }

    if config.show_preferred_device && acl.ok_write(ACL_USER_DEVICE) {
        if let Some(value) = params.get("u_devid") {
            active.preferred_device_id = Set(filter_id(value));
        }
    }

    if config.show_address {
        if let Some(value) = params.get("u_adrl1") {
            active.address_line1 = Set(value.trim().to_string());
        }
        if let Some(value) = params.get("u_adrcity") {
            active.address_city = Set(value.trim().to_string());
        }
        if let Some(value) = params.get("u_adrst") {
            active.address_state = Set(value.trim().to_string());
        }
    }
    if config.show_office_location {
        if let Some(value) = params.get("u_ofcloc") {
            active.office_location = Set(value.trim().to_string());
        }
    }

    // Custom attributes: declared keys only.
    if !config.custom_attribute_keys.is_empty() {
        let mut attributes: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&selected.custom_attributes).unwrap_or_default();
        let mut changed = false;
        for key in &config.custom_attribute_keys {
            if let Some(value) = params.get(&format!("u_c_{key}")) {
                attributes.insert(
                    key.clone(),
                    serde_json::Value::String(value.trim().to_string()),
                );
                changed = true;
            }
        }
        if changed {
            let encoded = serde_json::to_string(&attributes)
                .unwrap_or_else(|_| selected.custom_attributes.clone());
            active.custom_attributes = Set(encoded);
        }
    }

    // Authorized device groups: blank and "none" slots are dropped,
    // duplicates collapse to the first occurrence. An empty assignment
    // means no restriction.
    if acl.ok_write(ACL_USER_GROUPS) {
        let known: Vec<String> = DeviceGroup::find()
            .filter(device_group::Column::AccountId.eq(selected.account_id.clone()))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|g| g.group_id)
            .collect();
        let mut slots: Vec<String> = Vec::new();
        let mut any_present = false;
        for n in 0..config.authorized_group_count {
            if let Some(value) = params.get(&format!("u_dg_{n}")) {
                any_present = true;
                let group_id = filter_id(value);
                if group_id.is_empty() || group_id == GROUP_NONE {
                    continue;
                }
                if !known.iter().any(|g| *g == group_id) {
                    return Ok(SaveResult::Rejected(MSG_INVALID_GROUP.to_string()));
                }
                if !slots.contains(&group_id) {
                    slots.push(group_id);
                }
            }
        }
        if any_present {
            pending_groups = Some(slots);
        }
    }

    if config.show_notes {
        if let Some(value) = params.get("u_notes") {
            active.notes = Set(value.trim().to_string());
        }
    }

    // Max access level and role, gated on the editor's own permissions.
    if acl.ok_write(ACL_USER_ACLS) {
        if let Some(value) = params.get("u_accLvl") {
            if let Some(level) = AccessLevel::parse(value) {
                active.max_access_level = Set(level);
            }
        }
    }

    if acl.ok_write(ACL_USER_ROLE) {
        if let Some(value) = params.get("u_role") {
            let role_id = filter_id(value);
            if role_id.is_empty() || role_id == "none" {
                active.role_id = Set(String::new());
            } else {
                let exists = Role::find_by_id((selected.account_id.clone(), role_id.clone()))
                    .one(&state.db)
                    .await?
                    .is_some();
                if !exists {
                    return Ok(SaveResult::Rejected(MSG_INVALID_ROLE.to_string()));
                }
                active.role_id = Set(role_id);
            }
        }
    }

    // ACL overrides: the literal "default" clears an override, and any
    // override targeting the admin user is cleared rather than stored.
    if acl.ok_write(ACL_USER_ACLS) {
        for name in editable_acl_names() {
            if let Some(value) = params.get(&format!("u_acl_{name}")) {
                let level = AccessLevel::parse(value);
                if selected.is_admin() || value == "default" {
                    pending_acls.push((name, None));
                } else if let Some(level) = level {
                    pending_acls.push((name, Some(level)));
                }
            }
        }
    }

    // All validation passed; the user row is written exactly once.
    active.update(&state.db).await?;

    if let Some(groups) = pending_groups {
        UserDeviceGroup::delete_many()
            .filter(user_device_group::Column::AccountId.eq(selected.account_id.clone()))
            .filter(user_device_group::Column::UserId.eq(selected.user_id.clone()))
            .exec(&state.db)
            .await?;
        for (seq, group_id) in groups.iter().enumerate() {
            user_device_group::ActiveModel {
                account_id: Set(selected.account_id.clone()),
                user_id: Set(selected.user_id.clone()),
                seq: Set(seq as i32),
                group_id: Set(group_id.clone()),
            }
            .insert(&state.db)
            .await?;
        }
    }

    for (name, level) in pending_acls {
        UserAcl::delete_by_id((
            selected.account_id.clone(),
            selected.user_id.clone(),
            name.to_string(),
        ))
        .exec(&state.db)
        .await?;
        if let Some(level) = level {
            user_acl::ActiveModel {
                account_id: Set(selected.account_id.clone()),
                user_id: Set(selected.user_id.clone()),
                acl_id: Set(name.to_string()),
                access_level: Set(level),
            }
            .insert(&state.db)
            .await?;
        }
    }

    info!("updated user {}/{}", selected.account_id, selected.user_id);
    Ok(SaveResult::Saved)
}

async fn render_list(
    state: &AppState,
    current: &CurrentUser,
    flags: &AccessFlags,
    selected_id: &str,
    alert: String,
) -> Result<Response, PortalError> {
    let users = list_users(state, current, flags).await?;
    // Keep the submitted selection only while it still exists.
    let effective = if users.iter().any(|u| u.user_id == selected_id) {
        selected_id.to_string()
    } else {
        String::new()
    };
    let rows = users
        .iter()
        .map(|u| UserRow {
            user_id: u.user_id.clone(),
            description: u.description.clone(),
            contact_name: u.contact_name.clone(),
            role_id: u.role_id.clone(),
            active: if u.is_active { "yes" } else { "no" }.to_string(),
            selected: u.user_id == effective,
        })
        .collect();
    let page = UserListPage {
        page_title: PAGE_TITLE.to_string(),
        alert,
        rows,
        allow_view: flags.allow_view,
        allow_edit: flags.allow_edit,
        allow_new: flags.allow_new,
        allow_delete: flags.allow_delete,
    };
    Ok(render(&page)?.into_response())
}

fn level_items(selected: AccessLevel, max: AccessLevel) -> Vec<ComboItem> {
    [
        AccessLevel::None,
        AccessLevel::Read,
        AccessLevel::Write,
        AccessLevel::All,
    ]
    .into_iter()
    .filter(|level| *level <= max)
    .map(|level| ComboItem::new(level.as_str(), level.as_str(), level == selected))
    .collect()
}

async fn render_form(
    state: &AppState,
    current: &CurrentUser,
    viewer_acl: &AclContext,
    user: &user::Model,
    read_only: bool,
    alert: String,
) -> Result<Response, PortalError> {
    let config = &state.config;

    let mut combo_rows = vec![ComboRow::new("Active", "u_actv", yes_no_items(user.is_active))];
    combo_rows.push(ComboRow::new(
        "Timezone",
        "u_tmz",
        config
            .timezones
            .iter()
            .map(|tz| ComboItem::new(tz.clone(), tz.clone(), *tz == user.timezone))
            .collect(),
    ));
    combo_rows.push(ComboRow::new(
        "Speed Units",
        "u_spdun",
        vec![
            ComboItem::new("mph", "mph", user.speed_units != "kph"),
            ComboItem::new("kph", "kph", user.speed_units == "kph"),
        ],
    ));
    combo_rows.push(ComboRow::new(
        "Distance Units",
        "u_dstun",
        vec![
            ComboItem::new("miles", "Miles", user.distance_units != "km"),
            ComboItem::new("km", "Kilometers", user.distance_units == "km"),
        ],
    ));
    if viewer_acl.ok_write(ACL_USER_ACLS) {
        combo_rows.push(ComboRow::new(
            "Maximum Access Level",
            "u_accLvl",
            level_items(user.max_access_level, AccessLevel::All),
        ));
    }
    if viewer_acl.ok_write(ACL_USER_ROLE) {
        let roles = Role::find()
            .filter(role::Column::AccountId.eq(user.account_id.clone()))
            .order_by_asc(role::Column::RoleId)
            .all(&state.db)
            .await?;
        let mut items = vec![ComboItem::new("none", "(none)", user.role_id.is_empty())];
        items.extend(roles.iter().map(|r| {
            ComboItem::new(r.role_id.clone(), r.role_id.clone(), r.role_id == user.role_id)
        }));
        combo_rows.push(ComboRow::new("Role", "u_role", items));
    }

    let mut text_rows = vec![
        FieldRow::new("Description", "u_name", user.description.clone()),
        FieldRow::new("Contact Name", "u_contact", user.contact_name.clone()),
        FieldRow::new("Contact Phone", "u_phone", user.contact_phone.clone()),
        FieldRow::new("Contact Email", "u_email", user.contact_email.clone()),
    ];
    if current.account.smtp_enabled {
        text_rows.push(FieldRow::new("Notify Email", "u_notify", user.notify_email.clone()));
    }
    text_rows.push(FieldRow::new(
        "First Login Page",
        "u_1stpage",
        user.first_login_page.clone(),
    ));
    if config.show_expiration && current.user.is_admin() {
        text_rows.push(FieldRow::new(
            "Expiration",
            "u_xpire",
            format_expiration(user.expires_at),
        ));
    }
    if config.show_preferred_device && viewer_acl.ok_write(ACL_USER_DEVICE) {
        text_rows.push(FieldRow::new(
            "Preferred Device",
            "u_devid",
            user.preferred_device_id.clone(),
        ));
    }
    if config.show_address {
        text_rows.push(FieldRow::new("Address", "u_adrl1", user.address_line1.clone()));
        text_rows.push(FieldRow::new("City", "u_adrcity", user.address_city.clone()));
        text_rows.push(FieldRow::new("State", "u_adrst", user.address_state.clone()));
    }
    if config.show_office_location {
        text_rows.push(FieldRow::new(
            "Office Location",
            "u_ofcloc",
            user.office_location.clone(),
        ));
    }
    if !config.custom_attribute_keys.is_empty() {
        let attributes: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&user.custom_attributes).unwrap_or_default();
        for key in &config.custom_attribute_keys {
            let value = attributes
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            text_rows.push(FieldRow::new(key.clone(), format!("u_c_{key}"), value));
        }
    }

    let mut group_rows = Vec::new();
    if viewer_acl.ok_write(ACL_USER_GROUPS) {
        let groups = DeviceGroup::find()
            .filter(device_group::Column::AccountId.eq(user.account_id.clone()))
            .order_by_asc(device_group::Column::GroupId)
            .all(&state.db)
            .await?;
        let assigned: Vec<String> = UserDeviceGroup::find()
            .filter(user_device_group::Column::AccountId.eq(user.account_id.clone()))
            .filter(user_device_group::Column::UserId.eq(user.user_id.clone()))
            .order_by_asc(user_device_group::Column::Seq)
            .all(&state.db)
            .await?
            .into_iter()
            .map(|row| row.group_id)
            .collect();
        for n in 0..config.authorized_group_count {
            let slot_value = assigned.get(n).cloned().unwrap_or_default();
            let mut items = vec![ComboItem::new(GROUP_NONE, "(none)", slot_value.is_empty())];
            items.extend(groups.iter().map(|g| {
                ComboItem::new(g.group_id.clone(), g.group_id.clone(), g.group_id == slot_value)
            }));
            group_rows.push(ComboRow::new(
                format!("Device Group {}", n + 1),
                format!("u_dg_{n}"),
                items,
            ));
        }
    }

    let mut acl_rows = Vec::new();
    if viewer_acl.ok_read(ACL_USER_ACLS) {
        let user_acl_ctx = AclContext::load(&state.db, user).await?;
        for name in editable_acl_names() {
            let override_level = user_acl_ctx.override_level(name);
            let mut items = vec![ComboItem::new(
                "default",
                "(default)",
                override_level.is_none(),
            )];
            items.extend(level_items(
                override_level.unwrap_or(AccessLevel::None),
                AccessLevel::All,
            )
            .into_iter()
            .map(|mut item| {
                if override_level.is_none() {
                    item.selected = false;
                }
                item
            }));
            acl_rows.push(ComboRow::new(name, format!("u_acl_{name}"), items));
        }
    }

    let page = UserEditPage {
        page_title: PAGE_TITLE.to_string(),
        alert,
        read_only,
        user_id: user.user_id.clone(),
        password_value: PASSWORD_HOLDER.to_string(),
        text_rows,
        combo_rows,
        group_rows,
        acl_rows,
        show_notes: config.show_notes,
        notes: user.notes.clone(),
    };
    Ok(render(&page)?.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_parsing() {
        let epoch = parse_expiration("2026/12/31,23:59:59,GMT").unwrap();
        assert_eq!(format_expiration(epoch), "2026/12/31,23:59:59,UTC");
        // Date-only input is accepted at midnight.
        assert!(parse_expiration("2026/12/31").is_some());
        assert!(parse_expiration("next tuesday").is_none());
        assert!(parse_expiration("2026/12/31,noon").is_none());
    }

    #[test]
    fn expiration_zero_formats_blank() {
        assert_eq!(format_expiration(0), "");
    }

    #[test]
    fn command_resolution_prefers_explicit_submits() {
        let mut params = HashMap::new();
        assert_eq!(resolve_command(&params), Command::List);
        params.insert("u_subview".to_string(), "View".to_string());
        assert_eq!(resolve_command(&params), Command::View);
        params.insert("u_subchg".to_string(), "Change".to_string());
        assert_eq!(resolve_command(&params), Command::Update);
        params.insert("u_subnew".to_string(), "New".to_string());
        assert_eq!(resolve_command(&params), Command::New);
    }
}
