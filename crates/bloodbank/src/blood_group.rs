//! ABO/Rh blood groups.
//!
//! The blood group is the matching key between donor supply and requests.
//! Only the eight canonical groups are accepted.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the eight ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    /// A positive.
    #[serde(rename = "A+")]
    APos,
    /// A negative.
    #[serde(rename = "A-")]
    ANeg,
    /// B positive.
    #[serde(rename = "B+")]
    BPos,
    /// B negative.
    #[serde(rename = "B-")]
    BNeg,
    /// O positive.
    #[serde(rename = "O+")]
    OPos,
    /// O negative.
    #[serde(rename = "O-")]
    ONeg,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPos,
    /// AB negative.
    #[serde(rename = "AB-")]
    AbNeg,
}

/// Error returned when text is not a recognised blood group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown blood group '{input}' (expected one of A+, A-, B+, B-, O+, O-, AB+, AB-)")]
pub struct ParseBloodGroupError {
    input: String,
}

impl BloodGroup {
    /// All groups, in the order they are presented to users.
    pub const ALL: [Self; 8] = [
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::OPos,
        Self::ONeg,
        Self::AbPos,
        Self::AbNeg,
    ];

    /// The canonical spelling, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = ParseBloodGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseBloodGroupError {
                input: s.to_string(),
            })
    }
}

impl ToSql for BloodGroup {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BloodGroup {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_canonical_spelling() {
        assert_eq!(BloodGroup::APos.to_string(), "A+");
        assert_eq!(BloodGroup::ONeg.to_string(), "O-");
        assert_eq!(BloodGroup::AbPos.to_string(), "AB+");
        assert_eq!(format!("{:<4}|", BloodGroup::BNeg), "B-  |");
    }

    #[test]
    fn test_parse_every_group() {
        for group in BloodGroup::ALL {
            assert_eq!(group.as_str().parse::<BloodGroup>().unwrap(), group);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!("ab-".parse::<BloodGroup>().unwrap(), BloodGroup::AbNeg);
        assert_eq!(" o+ ".parse::<BloodGroup>().unwrap(), BloodGroup::OPos);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for input in ["", "C+", "A", "O", "AB", "A+-", "positive"] {
            let err = input.parse::<BloodGroup>().unwrap_err();
            assert!(err.to_string().contains("unknown blood group"));
        }
    }

    #[test]
    fn test_all_is_unique() {
        let mut groups = BloodGroup::ALL.to_vec();
        groups.sort();
        groups.dedup();
        assert_eq!(groups.len(), 8);
    }

    #[test]
    fn test_serde_uses_canonical_spelling() {
        let json = serde_json::to_string(&BloodGroup::AbNeg).unwrap();
        assert_eq!(json, "\"AB-\"");
        let group: BloodGroup = serde_json::from_str("\"B+\"").unwrap();
        assert_eq!(group, BloodGroup::BPos);
    }

    #[test]
    fn test_sql_round_trip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let group: BloodGroup = conn
            .query_row("SELECT ?1", [BloodGroup::ONeg], |row| row.get(0))
            .unwrap();
        assert_eq!(group, BloodGroup::ONeg);

        let bad: rusqlite::Result<BloodGroup> =
            conn.query_row("SELECT 'Q+'", [], |row| row.get(0));
        assert!(bad.is_err());
    }
}
