use askama::Template;
use axum::response::Html;

use crate::error::PortalError;

/// One option of a select element.
#[derive(Clone, Debug)]
pub struct ComboItem {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl ComboItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// A labeled text input row on an edit form.
#[derive(Clone, Debug)]
pub struct FieldRow {
    pub label: String,
    pub name: String,
    pub value: String,
}

impl FieldRow {
    pub fn new(label: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A labeled select row on an edit form.
#[derive(Clone, Debug)]
pub struct ComboRow {
    pub label: String,
    pub name: String,
    pub items: Vec<ComboItem>,
}

impl ComboRow {
    pub fn new(label: impl Into<String>, name: impl Into<String>, items: Vec<ComboItem>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            items,
        }
    }
}

/// Yes/no select items with the current value selected.
pub fn yes_no_items(selected_yes: bool) -> Vec<ComboItem> {
    vec![
        ComboItem::new("yes", "Yes", selected_yes),
        ComboItem::new("no", "No", !selected_yes),
    ]
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub page_title: String,
    pub alert: String,
    pub account_id: String,
    pub user_id: String,
}

/// A report offered on the menu page.
#[derive(Clone, Debug)]
pub struct ReportRow {
    pub name: String,
    pub title: String,
}

#[derive(Template)]
#[template(path = "report_menu.html")]
pub struct ReportMenuPage {
    pub page_title: String,
    pub alert: String,
    pub category: String,
    pub category_title: String,
    pub show_picker: bool,
    pub picker_label: String,
    pub picker_name: String,
    pub picker_items: Vec<ComboItem>,
    pub date_from: String,
    pub date_to: String,
    pub timezone_items: Vec<ComboItem>,
    pub limit: String,
    pub format_items: Vec<ComboItem>,
    pub reports: Vec<ReportRow>,
}

/// One user line in the admin list view.
#[derive(Clone, Debug)]
pub struct UserRow {
    pub user_id: String,
    pub description: String,
    pub contact_name: String,
    pub role_id: String,
    pub active: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "user_list.html")]
pub struct UserListPage {
    pub page_title: String,
    pub alert: String,
    pub rows: Vec<UserRow>,
    pub allow_view: bool,
    pub allow_edit: bool,
    pub allow_new: bool,
    pub allow_delete: bool,
}

#[derive(Template)]
#[template(path = "user_edit.html")]
pub struct UserEditPage {
    pub page_title: String,
    pub alert: String,
    pub read_only: bool,
    pub user_id: String,
    pub password_value: String,
    pub text_rows: Vec<FieldRow>,
    pub combo_rows: Vec<ComboRow>,
    pub group_rows: Vec<ComboRow>,
    pub acl_rows: Vec<ComboRow>,
    pub show_notes: bool,
    pub notes: String,
}

/// Render a template into an HTML response body.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, PortalError> {
    Ok(Html(template.render()?))
}
