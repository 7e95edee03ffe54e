//! Plan and plan-day matrix use-cases.
//!
//! # Responsibility
//! - Create and read plans.
//! - Initialize, read, update and delete the day grid of one
//!   `(employee, plan)` pair.
//!
//! # Invariants
//! - Initialization covers exactly the stored calendar days of the range and
//!   is all-or-nothing; a second initialization of the same days is a
//!   `Conflict` and adds no rows.
//! - Concurrent updates of the same days are last-write-wins.

use super::log_mutation;
use crate::model::calendar::validate_date_range;
use crate::model::plan::{NewPlan, Plan, PlanDayEntry, PlanDayUpdate};
use crate::model::{EmployeeId, PlanId};
use crate::repo::calendar_repo::CalendarRepository;
use crate::repo::plan_day_repo::PlanDayRepository;
use crate::repo::plan_repo::PlanRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::collections::BTreeMap;
use std::time::Instant;

/// Plan service facade.
pub struct PlanService<R: PlanRepository> {
    repo: R,
}

impl<R: PlanRepository> PlanService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a plan and returns it as stored.
    ///
    /// # Errors
    /// - `Validation` for a blank name or malformed/reversed dates.
    /// - `Conflict` when the name is taken.
    pub fn create_plan(&self, plan: &NewPlan) -> RepoResult<Plan> {
        let id = self.repo.create_plan(plan)?;
        info!("event=plan_create module=plan status=ok plan_id={id}");
        self.repo
            .get_plan(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("created plan {id} not found in read-back")))
    }

    pub fn get_plan(&self, id: PlanId) -> RepoResult<Option<Plan>> {
        self.repo.get_plan(id)
    }

    pub fn list_plans(&self) -> RepoResult<Vec<Plan>> {
        self.repo.list_plans()
    }
}

/// Day-grid service over calendar and plan-day repositories.
pub struct PlanMatrixService<C: CalendarRepository, P: PlanDayRepository> {
    calendar: C,
    plan_days: P,
}

impl<C: CalendarRepository, P: PlanDayRepository> PlanMatrixService<C, P> {
    pub fn new(calendar: C, plan_days: P) -> Self {
        Self {
            calendar,
            plan_days,
        }
    }

    /// Creates a zero-hour entry for every calendar day in `[start, end]`.
    ///
    /// Returns the number of entries created.
    ///
    /// # Errors
    /// - `Validation` for malformed bounds or a range with no calendar days.
    /// - `NotFound` when the employee or plan does not exist.
    /// - `Conflict` when any of the days is already planned for the pair;
    ///   callers treat this as "already initialized".
    pub fn initialize_range(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        start: &str,
        end: &str,
    ) -> RepoResult<usize> {
        let started_at = Instant::now();
        let outcome = self.initialize_range_inner(employee_id, plan_id, start, end);
        log_mutation("plan_initialize", "plan", started_at, &outcome);
        outcome
    }

    fn initialize_range_inner(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        start: &str,
        end: &str,
    ) -> RepoResult<usize> {
        validate_date_range(start, end)?;
        let dates = self.calendar.list_dates(start, end)?;
        if dates.is_empty() {
            return Err(RepoError::validation(
                "date_range",
                format!("no calendar days between {start} and {end}"),
            ));
        }
        self.plan_days.insert_zeroed(employee_id, plan_id, &dates)
    }

    /// Planned hours for every calendar date in `[start, end]`; days without
    /// a stored entry report `0.0`.
    pub fn get_range(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        start: &str,
        end: &str,
    ) -> RepoResult<BTreeMap<String, f64>> {
        validate_date_range(start, end)?;
        self.plan_days.planned_hours(employee_id, plan_id, start, end)
    }

    pub fn get_entry(
        &self,
        calendar_date: &str,
        employee_id: EmployeeId,
        plan_id: PlanId,
    ) -> RepoResult<Option<PlanDayEntry>> {
        self.plan_days.get_entry(calendar_date, employee_id, plan_id)
    }

    /// Updates existing entries keyed by ISO date, atomically.
    ///
    /// # Errors
    /// - `Validation` for malformed dates or negative/non-finite hours.
    /// - `NotFound` when any date has no entry; nothing is written.
    pub fn update_batch(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        updates: &BTreeMap<String, PlanDayUpdate>,
    ) -> RepoResult<usize> {
        let started_at = Instant::now();
        let outcome = self.plan_days.update_batch(employee_id, plan_id, updates);
        log_mutation("plan_update", "plan", started_at, &outcome);
        outcome
    }

    /// Removes every entry of the pair. Returns `0` when there was none.
    pub fn delete_assignment(&self, employee_id: EmployeeId, plan_id: PlanId) -> RepoResult<usize> {
        let started_at = Instant::now();
        let outcome = self.plan_days.delete_assignment(employee_id, plan_id);
        log_mutation("plan_delete_assignment", "plan", started_at, &outcome);
        outcome
    }

    /// Removes one entry; returns whether it existed.
    pub fn delete_entry(
        &self,
        calendar_date: &str,
        employee_id: EmployeeId,
        plan_id: PlanId,
    ) -> RepoResult<bool> {
        self.plan_days
            .delete_entry(calendar_date, employee_id, plan_id)
    }
}
