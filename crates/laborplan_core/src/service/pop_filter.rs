//! Period-of-performance filter for calendar views.
//!
//! # Responsibility
//! - Resolve a PoP window to calendar day ids with a single lookup.
//! - Flag view days outside the window as disabled.
//!
//! # Invariants
//! - Both window bounds must resolve to two distinct stored days, start
//!   before end; anything else is a validation error.
//! - Id order equals date order (calendar import appends contiguously), so
//!   id comparison classifies days exactly like date comparison would.

use crate::model::calendar::{parse_iso_date, CalendarViewDay};
use crate::repo::calendar_repo::CalendarRepository;
use crate::repo::{RepoError, RepoResult};
use log::debug;

/// Inclusive id range of a resolved period of performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopWindow {
    pub start_id: i64,
    pub end_id: i64,
}

impl PopWindow {
    pub fn contains(&self, day_id: i64) -> bool {
        (self.start_id..=self.end_id).contains(&day_id)
    }

    /// Marks days outside the window and returns how many were disabled.
    ///
    /// When every day already lies inside the window nothing is touched.
    pub fn mark(&self, days: &mut [CalendarViewDay]) -> usize {
        let min_id = days.iter().map(|day| day.id).min();
        let max_id = days.iter().map(|day| day.id).max();
        let (Some(min_id), Some(max_id)) = (min_id, max_id) else {
            return 0;
        };
        if min_id >= self.start_id && max_id <= self.end_id {
            debug!("event=pop_filter module=service status=ok path=inside days={}", days.len());
            return 0;
        }

        let mut disabled = 0;
        for day in days.iter_mut() {
            day.disabled = !self.contains(day.id);
            if day.disabled {
                disabled += 1;
            }
        }
        debug!(
            "event=pop_filter module=service status=ok path=scan days={} disabled={disabled}",
            days.len()
        );
        disabled
    }
}

/// Resolves `[pop_start, pop_end]` to calendar day ids.
pub fn resolve_pop_window<C: CalendarRepository + ?Sized>(
    calendar: &C,
    pop_start: &str,
    pop_end: &str,
) -> RepoResult<PopWindow> {
    parse_iso_date("pop_start", pop_start)?;
    parse_iso_date("pop_end", pop_end)?;

    let refs = calendar.resolve_day_refs(&[pop_start, pop_end])?;
    if refs.len() != 2 {
        return Err(RepoError::validation(
            "pop_window",
            format!(
                "`{pop_start}`..`{pop_end}` must resolve to two distinct calendar days, resolved {}",
                refs.len()
            ),
        ));
    }

    let id_of = |date: &str| {
        refs.iter()
            .find(|day| day.calendar_date == date)
            .map(|day| day.id)
            .ok_or_else(|| RepoError::InvalidData(format!("calendar lookup did not return `{date}`")))
    };
    let start_id = id_of(pop_start)?;
    let end_id = id_of(pop_end)?;
    if start_id > end_id {
        return Err(RepoError::validation(
            "pop_window",
            format!("end `{pop_end}` falls before start `{pop_start}`"),
        ));
    }

    Ok(PopWindow { start_id, end_id })
}

/// Flags `days` outside the PoP window; returns how many were disabled.
pub fn apply_pop_filter<C: CalendarRepository + ?Sized>(
    calendar: &C,
    pop_start: &str,
    pop_end: &str,
    days: &mut [CalendarViewDay],
) -> RepoResult<usize> {
    let window = resolve_pop_window(calendar, pop_start, pop_end)?;
    Ok(window.mark(days))
}
