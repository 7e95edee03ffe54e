//! Calendar day store use-cases.
//!
//! # Responsibility
//! - Import fiscal calendar rows.
//! - Serve date lists, period lookups, standard-hour indexes and
//!   PoP-filtered period views.
//!
//! # Invariants
//! - Date inputs are validated before any query runs.
//! - Range reads that must be non-empty report `NotFound`, never an empty
//!   result.

use super::log_mutation;
use super::pop_filter::apply_pop_filter;
use crate::model::calendar::{
    month_name, parse_fiscal_period, parse_iso_date, validate_date_range, CalendarDay,
    CalendarDayImport, CalendarViewDay, PeriodView,
};
use crate::repo::calendar_repo::CalendarRepository;
use crate::repo::{RepoError, RepoResult};
use std::collections::BTreeMap;
use std::time::Instant;

/// Calendar service facade over a calendar repository.
pub struct CalendarService<C: CalendarRepository> {
    repo: C,
}

impl<C: CalendarRepository> CalendarService<C> {
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    /// Borrow the underlying repository, e.g. to share it with other services.
    pub fn repository(&self) -> &C {
        &self.repo
    }

    /// Appends calendar rows atomically; returns the number inserted.
    pub fn import_days(&self, days: &[CalendarDayImport]) -> RepoResult<usize> {
        let started_at = Instant::now();
        let outcome = self.repo.import_days(days);
        log_mutation("calendar_import", "calendar", started_at, &outcome);
        outcome
    }

    /// Ordered ISO dates in `[start, end]`.
    ///
    /// # Errors
    /// - `Validation` for malformed or reversed bounds.
    /// - `NotFound` when the calendar holds no day in the range.
    pub fn list_dates(&self, start: &str, end: &str) -> RepoResult<Vec<String>> {
        validate_date_range(start, end)?;
        let dates = self.repo.list_dates(start, end)?;
        if dates.is_empty() {
            return Err(RepoError::NotFound(format!(
                "calendar days between {start} and {end}"
            )));
        }
        Ok(dates)
    }

    /// Rows of one fiscal period, ordered by date.
    pub fn lookup(&self, fiscal_period: &str) -> RepoResult<Vec<CalendarDay>> {
        parse_fiscal_period(fiscal_period)?;
        self.repo.days_in_period(fiscal_period)
    }

    /// Standard hours keyed by date for `[start, end]`.
    pub fn standard_hours(&self, start: &str, end: &str) -> RepoResult<BTreeMap<String, f64>> {
        validate_date_range(start, end)?;
        let days = self.repo.days_in_range(start, end)?;
        if days.is_empty() {
            return Err(RepoError::NotFound(format!(
                "calendar days between {start} and {end}"
            )));
        }
        Ok(days
            .into_iter()
            .map(|day| (day.calendar_date, day.standard_hours))
            .collect())
    }

    /// One fiscal period as calendar cells, with days outside the period of
    /// performance `[pop_start, pop_end]` disabled.
    pub fn period_view(
        &self,
        pop_start: &str,
        pop_end: &str,
        fiscal_period: &str,
    ) -> RepoResult<PeriodView> {
        parse_iso_date("pop_start", pop_start)?;
        parse_iso_date("pop_end", pop_end)?;
        let (year, month) = parse_fiscal_period(fiscal_period)?;

        let stored = self.repo.days_in_period(fiscal_period)?;
        if stored.is_empty() {
            return Err(RepoError::NotFound(format!("fiscal period {fiscal_period}")));
        }

        let mut days = stored
            .iter()
            .map(|day| {
                CalendarViewDay::from_day(day).map_err(|err| {
                    RepoError::InvalidData(format!("calendar day {}: {err}", day.id))
                })
            })
            .collect::<RepoResult<Vec<_>>>()?;
        apply_pop_filter(&self.repo, pop_start, pop_end, &mut days)?;

        Ok(PeriodView {
            fiscal_period: fiscal_period.to_string(),
            title: format!("{} {year}", month_name(month)?),
            days,
        })
    }
}
