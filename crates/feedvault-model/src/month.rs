// SPDX-License-Identifier: Apache-2.0

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const MONTH_KEY_LEN: usize = 7;

pub fn parse_month(input: &str) -> Result<MonthKey, ValidationError> {
    MonthKey::parse(input)
}

/// Calendar month in `YYYY-MM` form. Ordering is chronological, which is
/// also the byte order of the zero-padded string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: u16,
    month: u8,
}

impl MonthKey {
    pub fn from_year_month(year: u16, month: u8) -> Result<Self, ValidationError> {
        if !(1..=9999).contains(&year) {
            return Err(ValidationError(format!("year out of range: {year}")));
        }
        if !(1..=12).contains(&month) {
            return Err(ValidationError(format!("month out of range: {month}")));
        }
        Ok(Self { year, month })
    }

    /// For constants only: out-of-range parts fail const evaluation.
    #[must_use]
    pub const fn new_const(year: u16, month: u8) -> Self {
        assert!(year >= 1 && year <= 9999, "year out of range");
        assert!(month >= 1 && month <= 12, "month out of range");
        Self { year, month }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        let bytes = s.as_bytes();
        if bytes.len() != MONTH_KEY_LEN || bytes[4] != b'-' {
            return Err(ValidationError(format!(
                "month key must be YYYY-MM, got {s:?}"
            )));
        }
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ValidationError(format!(
                "month key must be numeric YYYY-MM, got {s:?}"
            )));
        }
        let year = year
            .parse::<u16>()
            .map_err(|e| ValidationError(format!("invalid year in {s:?}: {e}")))?;
        let month = month
            .parse::<u8>()
            .map_err(|e| ValidationError(format!("invalid month in {s:?}: {e}")))?;
        Self::from_year_month(year, month)
    }

    #[must_use]
    pub const fn year(self) -> u16 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    #[must_use]
    pub fn succ(self) -> Option<Self> {
        if self.month == 12 {
            Self::from_year_month(self.year.checked_add(1)?, 1).ok()
        } else {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }

    #[must_use]
    pub fn pred(self) -> Option<Self> {
        if self.month == 1 {
            Self::from_year_month(self.year.checked_sub(1)?, 12).ok()
        } else {
            Some(Self {
                year: self.year,
                month: self.month - 1,
            })
        }
    }

    /// Inclusive, ascending. Empty when `from > to`.
    #[must_use]
    pub fn range(from: Self, to: Self) -> MonthRange {
        MonthRange {
            next: (from <= to).then_some(from),
            last: to,
        }
    }

    #[must_use]
    pub fn shard_file_name(self) -> String {
        format!("{self}.json")
    }

    #[must_use]
    pub fn canonical_string(self) -> String {
        self.to_string()
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<MonthKey>,
    last: MonthKey,
}

impl Iterator for MonthRange {
    type Item = MonthKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.last {
            current.succ()
        } else {
            None
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unpadded_and_out_of_range() {
        assert!(MonthKey::parse("2024-1").is_err());
        assert!(MonthKey::parse("2024-13").is_err());
        assert!(MonthKey::parse("2024-00").is_err());
        assert!(MonthKey::parse("24-01").is_err());
        assert!(MonthKey::parse("2024/01").is_err());
        assert!(MonthKey::parse("2024-+1").is_err());
    }

    #[test]
    fn range_crosses_year_boundary() {
        let from = MonthKey::parse("2023-11").expect("from");
        let to = MonthKey::parse("2024-02").expect("to");
        let months: Vec<String> = MonthKey::range(from, to).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn range_is_empty_when_reversed() {
        let from = MonthKey::parse("2024-03").expect("from");
        let to = MonthKey::parse("2024-02").expect("to");
        assert_eq!(MonthKey::range(from, to).count(), 0);
    }

    #[test]
    fn serde_uses_string_form() {
        let key = MonthKey::parse("2024-07").expect("key");
        assert_eq!(serde_json::to_string(&key).expect("json"), "\"2024-07\"");
        let back: MonthKey = serde_json::from_str("\"2024-07\"").expect("decode");
        assert_eq!(back, key);
        assert!(serde_json::from_str::<MonthKey>("\"2024-7\"").is_err());
        assert_eq!(key.shard_file_name(), "2024-07.json");
    }
}
