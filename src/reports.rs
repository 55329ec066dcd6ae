use chrono::{NaiveDate, NaiveDateTime, Utc};
use model::entities::account;

use crate::acl::{
    AclContext, ACL_REPORT_DEVICE, ACL_REPORT_DRIVER, ACL_REPORT_FORMAT, ACL_REPORT_GROUP,
    ACL_REPORT_TABLE,
};
use crate::config::PortalConfig;

/// Date strings exchanged with the report menu form.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Report grouping shown as separate menu pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportCategory {
    Device,
    Group,
    Driver,
    Table,
}

impl ReportCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "device" => Some(Self::Device),
            "group" => Some(Self::Group),
            "driver" => Some(Self::Driver),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Group => "group",
            Self::Driver => "driver",
            Self::Table => "table",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Device => "Vehicle Reports",
            Self::Group => "Fleet Reports",
            Self::Driver => "Driver Reports",
            Self::Table => "Summary Reports",
        }
    }

    /// ACL gating visibility of this menu page.
    pub fn acl_name(&self) -> &'static str {
        match self {
            Self::Device => ACL_REPORT_DEVICE,
            Self::Group => ACL_REPORT_GROUP,
            Self::Driver => ACL_REPORT_DRIVER,
            Self::Table => ACL_REPORT_TABLE,
        }
    }
}

/// One selectable report definition.
#[derive(Clone, Copy, Debug)]
pub struct ReportEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub category: ReportCategory,
    pub acl_name: &'static str,
}

/// Static report catalog; never mutated at request time.
pub const REPORT_CATALOG: &[ReportEntry] = &[
    ReportEntry {
        name: "EventDetail",
        title: "Event Detail",
        category: ReportCategory::Device,
        acl_name: ACL_REPORT_DEVICE,
    },
    ReportEntry {
        name: "TripSummary",
        title: "Trip Summary",
        category: ReportCategory::Device,
        acl_name: ACL_REPORT_DEVICE,
    },
    ReportEntry {
        name: "SpeedViolations",
        title: "Speed Violations",
        category: ReportCategory::Device,
        acl_name: ACL_REPORT_DEVICE,
    },
    ReportEntry {
        name: "FleetSummary",
        title: "Fleet Summary",
        category: ReportCategory::Group,
        acl_name: ACL_REPORT_GROUP,
    },
    ReportEntry {
        name: "FleetMileage",
        title: "Fleet Mileage",
        category: ReportCategory::Group,
        acl_name: ACL_REPORT_GROUP,
    },
    ReportEntry {
        name: "DriverTimeDetail",
        title: "Driver Time Detail",
        category: ReportCategory::Driver,
        acl_name: ACL_REPORT_DRIVER,
    },
    ReportEntry {
        name: "DriverPerformance",
        title: "Driver Performance",
        category: ReportCategory::Driver,
        acl_name: ACL_REPORT_DRIVER,
    },
    ReportEntry {
        name: "LastKnownLocation",
        title: "Last Known Location",
        category: ReportCategory::Table,
        acl_name: ACL_REPORT_TABLE,
    },
];

/// Catalog entries for one category that the requester may read.
pub fn reports_for(category: ReportCategory, acl: &AclContext) -> Vec<&'static ReportEntry> {
    REPORT_CATALOG
        .iter()
        .filter(|entry| entry.category == category && acl.ok_read(entry.acl_name))
        .collect()
}

/// Output formats offered by the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
    Xml,
    Xls,
    Email,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "html" => Some(Self::Html),
            "csv" => Some(Self::Csv),
            "xml" => Some(Self::Xml),
            "xls" => Some(Self::Xls),
            "email" => Some(Self::Email),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::Xls => "xls",
            Self::Email => "email",
        }
    }
}

/// Which non-HTML formats the requester may choose. HTML is always
/// offered and is not represented here.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatGates {
    pub csv: bool,
    pub xml: bool,
    pub xls: bool,
    pub email: bool,
}

impl FormatGates {
    /// True when the format may be offered. HTML always passes.
    pub fn allows(&self, format: ReportFormat) -> bool {
        match format {
            ReportFormat::Html => true,
            ReportFormat::Csv => self.csv,
            ReportFormat::Xml => self.xml,
            ReportFormat::Xls => self.xls,
            ReportFormat::Email => self.email,
        }
    }
}

/// Gate the non-HTML formats on the format ACL, configuration and, for
/// email, the account's SMTP setup.
pub fn format_gates(
    config: &PortalConfig,
    account: &account::Model,
    acl: &AclContext,
) -> FormatGates {
    if !acl.ok_read(ACL_REPORT_FORMAT) {
        return FormatGates::default();
    }
    FormatGates {
        csv: config.enable_csv_export,
        xml: config.enable_xml_export,
        xls: config.enable_xls_export,
        email: account.smtp_enabled && !account.report_email.is_empty(),
    }
}

/// Resolved report date range: the normalized form strings plus the
/// day-start/day-end instants they denote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub from_text: String,
    pub to_text: String,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Resolve the from/to range: request value, else session value, else
/// today. A from-date past the to-date is clamped back to the to-date.
pub fn resolve_range(
    request_from: &str,
    request_to: &str,
    session_from: &str,
    session_to: &str,
) -> DateRange {
    let today = Utc::now().date_naive();
    let to_day = parse_day(request_to)
        .or_else(|| parse_day(session_to))
        .unwrap_or(today);
    let mut from_day = parse_day(request_from)
        .or_else(|| parse_day(session_from))
        .unwrap_or(today);
    if from_day > to_day {
        from_day = to_day;
    }
    DateRange {
        from_text: from_day.format(DATE_FORMAT).to_string(),
        to_text: to_day.format(DATE_FORMAT).to_string(),
        from: from_day.and_hms_opt(0, 0, 0).unwrap_or_default(),
        to: to_day.and_hms_opt(23, 59, 59).unwrap_or_default(),
    }
}

/// Resolve the display timezone: request value, else the session's
/// remembered choice, else user, else account, else UTC; unknown names
/// fall back the same way.
pub fn resolve_timezone(
    config: &PortalConfig,
    request_tz: &str,
    session_tz: &str,
    user_tz: &str,
    account_tz: &str,
) -> String {
    for candidate in [request_tz, session_tz, user_tz, account_tz] {
        if !candidate.is_empty() && config.timezones.iter().any(|tz| tz == candidate) {
            return candidate.to_string();
        }
    }
    "UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn request_range_wins_over_session() {
        let range = resolve_range("2026/03/01", "2026/03/05", "2026/01/01", "2026/01/31");
        assert_eq!(range.from_text, "2026/03/01");
        assert_eq!(range.to_text, "2026/03/05");
        assert_eq!(range.from.hour(), 0);
        assert_eq!(range.to.hour(), 23);
    }

    #[test]
    fn session_range_fills_missing_request() {
        let range = resolve_range("", "", "2026/01/01", "2026/01/31");
        assert_eq!(range.from_text, "2026/01/01");
        assert_eq!(range.to_text, "2026/01/31");
    }

    #[test]
    fn inverted_range_clamps_from_to_to() {
        let range = resolve_range("2026/03/10", "2026/03/05", "", "");
        assert_eq!(range.from_text, "2026/03/05");
        assert_eq!(range.to_text, "2026/03/05");
    }

    #[test]
    fn unparseable_dates_default_to_today() {
        let today = Utc::now().date_naive().format(DATE_FORMAT).to_string();
        let range = resolve_range("bogus", "also bogus", "", "");
        assert_eq!(range.from_text, today);
        assert_eq!(range.to_text, today);
    }

    #[test]
    fn timezone_resolution_order() {
        let config = PortalConfig::default();
        assert_eq!(
            resolve_timezone(&config, "US/Pacific", "US/Central", "US/Eastern", "UTC"),
            "US/Pacific"
        );
        // The session's remembered choice outranks the user's profile.
        assert_eq!(
            resolve_timezone(&config, "", "US/Central", "US/Eastern", "UTC"),
            "US/Central"
        );
        assert_eq!(
            resolve_timezone(&config, "", "", "US/Eastern", "UTC"),
            "US/Eastern"
        );
        assert_eq!(
            resolve_timezone(&config, "", "", "", "Europe/Prague"),
            "Europe/Prague"
        );
        assert_eq!(resolve_timezone(&config, "Mars/Olympus", "", "", ""), "UTC");
    }

    #[test]
    fn gates_always_allow_html() {
        let gates = FormatGates::default();
        assert!(gates.allows(ReportFormat::Html));
        assert!(!gates.allows(ReportFormat::Csv));
        assert!(!gates.allows(ReportFormat::Email));

        let gates = FormatGates {
            csv: true,
            ..Default::default()
        };
        assert!(gates.allows(ReportFormat::Csv));
        assert!(!gates.allows(ReportFormat::Xml));
    }

    #[test]
    fn category_parse_round_trip() {
        for raw in ["device", "group", "driver", "table"] {
            let category = ReportCategory::parse(raw).unwrap();
            assert_eq!(category.as_str(), raw);
        }
        assert!(ReportCategory::parse("fleet").is_none());
    }

    #[test]
    fn catalog_is_filtered_by_category() {
        let entries: Vec<_> = REPORT_CATALOG
            .iter()
            .filter(|e| e.category == ReportCategory::Group)
            .collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.acl_name == ACL_REPORT_GROUP));
    }
}
