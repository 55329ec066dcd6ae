use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use model::entities::device_group::GROUP_ALL;
use model::entities::{device, device_group, driver, prelude::*};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::acl::AclContext;
use crate::error::PortalError;
use crate::pages::{render, ComboItem, ReportMenuPage, ReportRow};
use crate::reports::{
    format_gates, reports_for, resolve_range, resolve_timezone, ReportCategory, ReportFormat,
};
use crate::schemas::AppState;
use crate::session::{authenticate, filter_id};

/// Report menu via plain navigation.
#[instrument(skip(state, jar, params))]
pub async fn report_menu(
    State(state): State<AppState>,
    Path(category): Path<String>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, PortalError> {
    render_menu(&state, &jar, &category, &params).await
}

/// Report menu form submit; same rendering, selections persisted.
#[instrument(skip(state, jar, params))]
pub async fn report_menu_submit(
    State(state): State<AppState>,
    Path(category): Path<String>,
    jar: CookieJar,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Response, PortalError> {
    render_menu(&state, &jar, &category, &params).await
}

async fn render_menu(
    state: &AppState,
    jar: &CookieJar,
    category: &str,
    params: &HashMap<String, String>,
) -> Result<Response, PortalError> {
    let current = authenticate(state, jar).await?;
    let category = ReportCategory::parse(category).ok_or(PortalError::NotFound)?;

    let acl = AclContext::load(&state.db, &current.user).await?;
    if !acl.ok_read(category.acl_name()) {
        return Err(PortalError::AccessDenied);
    }

    let mut session = current.session.clone();

    // Date range: request, else session, else today; written back.
    let range = resolve_range(
        params.get("date_fr").map(String::as_str).unwrap_or(""),
        params.get("date_to").map(String::as_str).unwrap_or(""),
        &session.date_from,
        &session.date_to,
    );
    session.date_from = range.from_text.clone();
    session.date_to = range.to_text.clone();

    let timezone = resolve_timezone(
        &state.config,
        params.get("timezone").map(String::as_str).unwrap_or(""),
        &session.timezone,
        &current.user.timezone,
        &current.account.timezone,
    );
    session.timezone = timezone.clone();

    // Limit strings are persisted verbatim.
    if let Some(limit) = params.get("limit") {
        session.report_limit = limit.clone();
    }

    // A requested or remembered format the gates no longer offer folds
    // back to HTML rather than leaving the combo without a selection.
    let gates = format_gates(&state.config, &current.account, &acl);
    let mut format = params
        .get("format")
        .and_then(|v| ReportFormat::parse(v))
        .or_else(|| ReportFormat::parse(&session.report_format))
        .unwrap_or(ReportFormat::Html);
    if !gates.allows(format) {
        format = ReportFormat::Html;
    }
    session.report_format = format.as_str().to_string();

    let (show_picker, picker_label, picker_name, picker_items) = match category {
        ReportCategory::Device => {
            let selected = pick_selection(params.get("device"), &session.device_id);
            let devices = Device::find()
                .filter(device::Column::AccountId.eq(current.account.id.clone()))
                .filter(device::Column::IsActive.eq(true))
                .order_by_asc(device::Column::DeviceId)
                .all(&state.db)
                .await?;
            let items: Vec<ComboItem> = devices
                .iter()
                .map(|d| {
                    ComboItem::new(
                        d.device_id.clone(),
                        display_label(&d.device_id, &d.description),
                        d.device_id == selected,
                    )
                })
                .collect();
            session.device_id = selected;
            (true, "Vehicle", "device", items)
        }
        ReportCategory::Group => {
            let selected = {
                let choice = pick_selection(params.get("group"), &session.group_id);
                if choice.is_empty() {
                    GROUP_ALL.to_string()
                } else {
                    choice
                }
            };
            let groups = DeviceGroup::find()
                .filter(device_group::Column::AccountId.eq(current.account.id.clone()))
                .order_by_asc(device_group::Column::GroupId)
                .all(&state.db)
                .await?;
            let mut items = vec![ComboItem::new(GROUP_ALL, "All Vehicles", selected == GROUP_ALL)];
            items.extend(groups.iter().map(|g| {
                ComboItem::new(
                    g.group_id.clone(),
                    display_label(&g.group_id, &g.description),
                    g.group_id == selected,
                )
            }));
            session.group_id = selected;
            (true, "Fleet", "group", items)
        }
        ReportCategory::Driver => {
            let selected = pick_selection(params.get("driver"), &session.driver_id);
            let drivers = Driver::find()
                .filter(driver::Column::AccountId.eq(current.account.id.clone()))
                .order_by_asc(driver::Column::DriverId)
                .all(&state.db)
                .await?;
            let items: Vec<ComboItem> = drivers
                .iter()
                .map(|d| {
                    ComboItem::new(
                        d.driver_id.clone(),
                        display_label(&d.driver_id, &d.description),
                        d.driver_id == selected,
                    )
                })
                .collect();
            session.driver_id = selected;
            (true, "Driver", "driver", items)
        }
        ReportCategory::Table => (false, "", "", Vec::new()),
    };

    state.sessions.update(&current.session_id, session.clone()).await;
    debug!(
        "report menu {} range {}..{} tz {}",
        category.as_str(),
        range.from_text,
        range.to_text,
        timezone
    );

    let timezone_items = state
        .config
        .timezones
        .iter()
        .map(|tz| ComboItem::new(tz.clone(), tz.clone(), *tz == timezone))
        .collect();

    let mut format_items = vec![ComboItem::new("html", "HTML", format == ReportFormat::Html)];
    if gates.csv {
        format_items.push(ComboItem::new("csv", "CSV", format == ReportFormat::Csv));
    }
    if gates.xml {
        format_items.push(ComboItem::new("xml", "XML", format == ReportFormat::Xml));
    }
    if gates.xls {
        format_items.push(ComboItem::new("xls", "XLS", format == ReportFormat::Xls));
    }
    if gates.email {
        format_items.push(ComboItem::new("email", "Email", format == ReportFormat::Email));
    }

    let reports = reports_for(category, &acl)
        .into_iter()
        .map(|entry| ReportRow {
            name: entry.name.to_string(),
            title: entry.title.to_string(),
        })
        .collect();

    let page = ReportMenuPage {
        page_title: category.title().to_string(),
        alert: String::new(),
        category: category.as_str().to_string(),
        category_title: category.title().to_string(),
        show_picker,
        picker_label: picker_label.to_string(),
        picker_name: picker_name.to_string(),
        picker_items,
        date_from: range.from_text,
        date_to: range.to_text,
        timezone_items,
        limit: session.report_limit.clone(),
        format_items,
        reports,
    };
    Ok(render(&page)?.into_response())
}

fn pick_selection(request: Option<&String>, session: &str) -> String {
    match request {
        Some(value) if !value.trim().is_empty() => filter_id(value),
        _ => session.to_string(),
    }
}

fn display_label(id: &str, description: &str) -> String {
    if description.is_empty() {
        id.to_string()
    } else {
        description.to_string()
    }
}
