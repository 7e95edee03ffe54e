//! Fiscal aggregation over the calendar.
//!
//! # Responsibility
//! - Collapse calendar days into fiscal-period summaries for a query range.
//!
//! # Invariants
//! - Every period touching the range is emitted whole: `range_start` and
//!   `range_end` are the period's own first and last days.
//! - Output is ordered by `(fiscal_year, fiscal_month)`.

use crate::model::calendar::validate_date_range;
use crate::model::fiscal::{period_display_name, FiscalPeriodSummary};
use crate::repo::calendar_repo::CalendarRepository;
use crate::repo::RepoResult;

/// Summaries of every fiscal period overlapping `[start, end]`.
pub fn summarize_periods<C: CalendarRepository + ?Sized>(
    calendar: &C,
    start: &str,
    end: &str,
) -> RepoResult<Vec<FiscalPeriodSummary>> {
    validate_date_range(start, end)?;

    calendar
        .period_rollups(start, end)?
        .into_iter()
        .map(|rollup| -> RepoResult<FiscalPeriodSummary> {
            Ok(FiscalPeriodSummary {
                display_name: period_display_name(rollup.fiscal_year, rollup.fiscal_month)?,
                fiscal_period: rollup.fiscal_period,
                range_start: rollup.range_start,
                range_end: rollup.range_end,
                total_standard_hours: rollup.total_standard_hours,
            })
        })
        .collect()
}

/// Use-case wrapper around [`summarize_periods`].
pub struct FiscalService<C: CalendarRepository> {
    calendar: C,
}

impl<C: CalendarRepository> FiscalService<C> {
    pub fn new(calendar: C) -> Self {
        Self { calendar }
    }

    pub fn summarize_periods(&self, start: &str, end: &str) -> RepoResult<Vec<FiscalPeriodSummary>> {
        summarize_periods(&self.calendar, start, end)
    }
}
