//! Fiscal calendar records and date helpers.
//!
//! # Responsibility
//! - Describe calendar days with fiscal labels and standard hours.
//! - Validate ISO dates, date ranges and fiscal period keys.
//!
//! # Invariants
//! - `CalendarDay::id` increases strictly with `calendar_date`.
//! - `fiscal_period == fiscal_period_key(fiscal_year, fiscal_month)`.

use super::ValidationError;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));
static FISCAL_PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})$").expect("valid fiscal period regex"));

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One stored day of the fiscal calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Surrogate assigned in chronological import order.
    pub id: i64,
    pub calendar_date: String,
    pub fiscal_year: i32,
    /// 1..=12.
    pub fiscal_month: u32,
    /// `YYYYMM`.
    pub fiscal_period: String,
    pub standard_hours: f64,
}

/// Calendar row supplied by an importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDayImport {
    pub calendar_date: String,
    pub fiscal_year: i32,
    pub fiscal_month: u32,
    pub fiscal_period: String,
    pub standard_hours: f64,
}

impl CalendarDayImport {
    /// Builds an import row, deriving `fiscal_period` from year and month.
    pub fn new(
        calendar_date: impl Into<String>,
        fiscal_year: i32,
        fiscal_month: u32,
        standard_hours: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            calendar_date: calendar_date.into(),
            fiscal_year,
            fiscal_month,
            fiscal_period: fiscal_period_key(fiscal_year, fiscal_month)?,
            standard_hours,
        })
    }

    /// Checks every field and returns the parsed calendar date.
    pub fn validate(&self) -> Result<NaiveDate, ValidationError> {
        let date = parse_iso_date("calendar_date", &self.calendar_date)?;
        let expected = fiscal_period_key(self.fiscal_year, self.fiscal_month)?;
        if self.fiscal_period != expected {
            return Err(ValidationError::new(
                "fiscal_period",
                format!(
                    "`{}` does not match fiscal year {} month {} (expected `{expected}`)",
                    self.fiscal_period, self.fiscal_year, self.fiscal_month
                ),
            ));
        }
        if !self.standard_hours.is_finite() || self.standard_hours < 0.0 {
            return Err(ValidationError::new(
                "standard_hours",
                format!("must be a non-negative number, got {}", self.standard_hours),
            ));
        }
        Ok(date)
    }
}

/// Calendar cell for one day of a fiscal period view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarViewDay {
    #[serde(skip)]
    pub id: i64,
    pub calendar_date: String,
    pub day_num: u32,
    pub standard_hours: f64,
    /// Outside the period of performance.
    pub disabled: bool,
}

impl CalendarViewDay {
    pub fn from_day(day: &CalendarDay) -> Result<Self, ValidationError> {
        let date = parse_iso_date("calendar_date", &day.calendar_date)?;
        Ok(Self {
            id: day.id,
            calendar_date: day.calendar_date.clone(),
            day_num: date.day(),
            standard_hours: day.standard_hours,
            disabled: false,
        })
    }
}

/// One fiscal period laid out as calendar cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodView {
    pub fiscal_period: String,
    /// Full month name and year, e.g. `October 2024`.
    pub title: String,
    pub days: Vec<CalendarViewDay>,
}

/// Parses a canonical `YYYY-MM-DD` date.
///
/// Rejects non-padded forms (`2025-1-1`) as well as impossible dates.
pub fn parse_iso_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    if !ISO_DATE_RE.is_match(value) {
        return Err(ValidationError::new(
            field,
            format!("expected YYYY-MM-DD, got `{value}`"),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| ValidationError::new(field, format!("`{value}` is not a date: {err}")))
}

/// Validates an inclusive `[start, end]` range of ISO dates.
pub fn validate_date_range(start: &str, end: &str) -> Result<(), ValidationError> {
    let start_date = parse_iso_date("start_date", start)?;
    let end_date = parse_iso_date("end_date", end)?;
    if start_date > end_date {
        return Err(ValidationError::new(
            "end_date",
            format!("`{end}` is before start `{start}`"),
        ));
    }
    Ok(())
}

/// Formats the `YYYYMM` key for a fiscal year and month.
pub fn fiscal_period_key(fiscal_year: i32, fiscal_month: u32) -> Result<String, ValidationError> {
    month_index(fiscal_month)?;
    if !(0..=9999).contains(&fiscal_year) {
        return Err(ValidationError::new(
            "fiscal_year",
            format!("must have four digits, got {fiscal_year}"),
        ));
    }
    Ok(format!("{fiscal_year:04}{fiscal_month:02}"))
}

/// Validates a `YYYYMM` key and returns its `(year, month)` parts.
pub fn parse_fiscal_period(value: &str) -> Result<(i32, u32), ValidationError> {
    let invalid = || ValidationError::new("fiscal_period", format!("expected YYYYMM, got `{value}`"));
    let captures = FISCAL_PERIOD_RE.captures(value).ok_or_else(invalid)?;
    let year = captures[1].parse::<i32>().map_err(|_| invalid())?;
    let month = captures[2].parse::<u32>().map_err(|_| invalid())?;
    month_index(month).map_err(|_| invalid())?;
    Ok((year, month))
}

/// Three-letter month abbreviation for a fiscal month.
pub fn month_abbreviation(fiscal_month: u32) -> Result<&'static str, ValidationError> {
    Ok(MONTH_ABBREVIATIONS[month_index(fiscal_month)?])
}

/// Full month name for a fiscal month.
pub fn month_name(fiscal_month: u32) -> Result<&'static str, ValidationError> {
    Ok(MONTH_NAMES[month_index(fiscal_month)?])
}

fn month_index(fiscal_month: u32) -> Result<usize, ValidationError> {
    match fiscal_month {
        1..=12 => Ok(fiscal_month as usize - 1),
        other => Err(ValidationError::new(
            "fiscal_month",
            format!("must be within 1..=12, got {other}"),
        )),
    }
}
