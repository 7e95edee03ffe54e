//! Planning table row assembly.
//!
//! # Responsibility
//! - Join grid assignments with fiscal summaries into display rows.
//!
//! # Invariants
//! - All rows of one response share the same period columns, computed once
//!   for the requested range.
//! - Rows are ordered by employee display name.

use super::fiscal_service::summarize_periods;
use crate::model::calendar::validate_date_range;
use crate::model::table::{PeriodHours, TableRow};
use crate::model::{EmployeeId, PlanId};
use crate::repo::calendar_repo::CalendarRepository;
use crate::repo::plan_day_repo::PlanDayRepository;
use crate::repo::{RepoError, RepoResult};
use log::debug;

/// Table row assembler over calendar and plan-day repositories.
pub struct TableService<C: CalendarRepository, P: PlanDayRepository> {
    calendar: C,
    plan_days: P,
}

impl<C: CalendarRepository, P: PlanDayRepository> TableService<C, P> {
    pub fn new(calendar: C, plan_days: P) -> Self {
        Self {
            calendar,
            plan_days,
        }
    }

    /// One row per `(employee name, plan, hourly rate)` present in the grid
    /// for the requested ids, each carrying the fiscal periods of
    /// `[start, end]`. Planned hours of a row add up every employee merged
    /// into it.
    ///
    /// # Errors
    /// - `Validation` when either id list is empty or the range is invalid.
    pub fn table_rows(
        &self,
        employee_ids: &[EmployeeId],
        plan_ids: &[PlanId],
        start: &str,
        end: &str,
    ) -> RepoResult<Vec<TableRow>> {
        if employee_ids.is_empty() {
            return Err(RepoError::validation("employee_ids", "must not be empty"));
        }
        if plan_ids.is_empty() {
            return Err(RepoError::validation("plan_ids", "must not be empty"));
        }
        validate_date_range(start, end)?;

        let assignments = self.plan_days.list_assignments(employee_ids, plan_ids)?;
        if assignments.is_empty() {
            return Ok(Vec::new());
        }
        let summaries = summarize_periods(&self.calendar, start, end)?;

        let mut rows = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let mut periods = Vec::with_capacity(summaries.len());
            for summary in &summaries {
                let planned_hours = self.plan_days.planned_total(
                    &assignment.employee_ids,
                    assignment.plan_id,
                    &summary.range_start,
                    &summary.range_end,
                )?;
                periods.push(PeriodHours {
                    summary: summary.clone(),
                    planned_hours,
                });
            }
            rows.push(TableRow {
                employee_id: assignment.employee_id,
                employee_ids: assignment.employee_ids,
                employee_name: assignment.employee_name,
                plan_id: assignment.plan_id,
                plan_name: assignment.plan_name,
                hourly_rate: assignment.hourly_rate,
                periods,
            });
        }

        debug!(
            "event=table_rows module=table status=ok rows={} periods={}",
            rows.len(),
            summaries.len()
        );
        Ok(rows)
    }
}
