//! Fiscal period summaries.
//!
//! A summary always spans the whole fiscal period, even when the query range
//! only touches part of it.

use super::calendar::month_abbreviation;
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Aggregated view of one fiscal period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriodSummary {
    pub fiscal_period: String,
    /// `Mon-YYYY`, e.g. `Oct-2024`.
    pub display_name: String,
    /// First calendar date of the period.
    pub range_start: String,
    /// Last calendar date of the period.
    pub range_end: String,
    pub total_standard_hours: f64,
}

/// Column label for a fiscal period, e.g. `Oct-2024`.
///
/// Fails instead of panicking when `fiscal_month` is outside 1..=12.
pub fn period_display_name(fiscal_year: i32, fiscal_month: u32) -> Result<String, ValidationError> {
    Ok(format!("{}-{fiscal_year}", month_abbreviation(fiscal_month)?))
}
