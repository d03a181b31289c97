//! Logical Person and Company records.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Age written by the conditional bulk update (Q3).
pub const AGED_AGE: i32 = 30;

/// Text appended to company names by the bulk rewrite (Q4).
pub const COMPANY_SUFFIX: &str = " Company";

/// People born strictly before this date are matched by Q3.
pub fn aged_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(1988, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Sex marker stored as `"M"` or `"F"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn marker(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// A company as generated, before any layout decides where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub domain: String,
    pub email: String,
    pub name: String,
    pub url: String,
    /// Two uppercase letters followed by eight digits.
    pub vat_number: String,
}

/// A person as generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub age: i32,
    pub company_email: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub first_name: String,
    pub full_name: String,
    pub sex: Sex,
}

/// Whole years between `date_of_birth` and `today`.
///
/// One year is subtracted when today's (month, day) precedes the birthday's.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday =
        (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day());
    today.year() - date_of_birth.year() - i32::from(before_birthday)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 15)), 34);
    }

    #[test]
    fn test_age_day_before_birthday() {
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 14)), 33);
    }

    #[test]
    fn test_age_earlier_month() {
        assert_eq!(age_on(date(1990, 12, 1), date(2024, 3, 1)), 33);
    }

    #[test]
    fn test_age_leap_day_birthday() {
        // Feb 28 precedes Feb 29, so the birthday has not happened yet.
        assert_eq!(age_on(date(2000, 2, 29), date(2023, 2, 28)), 22);
        assert_eq!(age_on(date(2000, 2, 29), date(2023, 3, 1)), 23);
    }

    #[test]
    fn test_cutoff() {
        assert_eq!(aged_cutoff(), date(1988, 1, 1));
    }

    #[test]
    fn test_sex_markers() {
        for sex in Sex::ALL {
            assert_eq!(Sex::from_marker(sex.marker()), Some(sex));
        }
        assert_eq!(Sex::from_marker("X"), None);
    }
}
