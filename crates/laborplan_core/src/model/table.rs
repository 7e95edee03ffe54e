//! Display-ready planning table rows.

use super::fiscal::FiscalPeriodSummary;
use super::{EmployeeId, PlanId};
use serde::{Deserialize, Serialize};

/// One fiscal-period column of a table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodHours {
    pub summary: FiscalPeriodSummary,
    /// Planned hours of the row's employees on its plan within the period's
    /// date span.
    pub planned_hours: f64,
}

/// One `(employee, plan, hourly rate)` row of a planning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub employee_id: EmployeeId,
    /// All employees merged into the row by name and rate.
    pub employee_ids: Vec<EmployeeId>,
    pub employee_name: String,
    pub plan_id: PlanId,
    pub plan_name: String,
    /// `None` when the employee has no compensation record.
    pub hourly_rate: Option<f64>,
    pub periods: Vec<PeriodHours>,
}
