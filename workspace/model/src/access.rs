use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered permission tier associated with a named capability.
///
/// Stored as a small integer so that levels compare naturally:
/// `None < Read < Write < All`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum AccessLevel {
    #[default]
    #[sea_orm(num_value = 0)]
    None,
    #[sea_orm(num_value = 1)]
    Read,
    #[sea_orm(num_value = 2)]
    Write,
    #[sea_orm(num_value = 3)]
    All,
}

impl AccessLevel {
    pub fn ok_read(self) -> bool {
        self >= AccessLevel::Read
    }

    pub fn ok_write(self) -> bool {
        self >= AccessLevel::Write
    }

    pub fn ok_all(self) -> bool {
        self >= AccessLevel::All
    }

    /// Parses the form token used by the access-level combo boxes.
    pub fn parse(value: &str) -> Option<AccessLevel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(AccessLevel::None),
            "read" => Some(AccessLevel::Read),
            "write" => Some(AccessLevel::Write),
            "all" => Some(AccessLevel::All),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
            AccessLevel::All => "all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AccessLevel::None < AccessLevel::Read);
        assert!(AccessLevel::Read < AccessLevel::Write);
        assert!(AccessLevel::Write < AccessLevel::All);
    }

    #[test]
    fn predicates_follow_ordering() {
        assert!(!AccessLevel::None.ok_read());
        assert!(AccessLevel::Read.ok_read());
        assert!(!AccessLevel::Read.ok_write());
        assert!(AccessLevel::Write.ok_write());
        assert!(!AccessLevel::Write.ok_all());
        assert!(AccessLevel::All.ok_all());
    }

    #[test]
    fn parse_accepts_tokens_case_insensitively() {
        assert_eq!(AccessLevel::parse("Write"), Some(AccessLevel::Write));
        assert_eq!(AccessLevel::parse(" all "), Some(AccessLevel::All));
        assert_eq!(AccessLevel::parse("default"), None);
    }
}
