//! Plans and the per-day planning grid.
//!
//! # Invariants
//! - Plan names are unique and non-blank.
//! - A plan-day entry is unique per `(calendar_date, employee_id, plan_id)`.
//! - Planned hours are finite and never negative.

use super::calendar::validate_date_range;
use super::{EmployeeId, PlanId, ValidationError};
use serde::{Deserialize, Serialize};

/// Named, date-bounded container for planning grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

/// Input for creating a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlan {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

impl NewPlan {
    pub fn new(
        name: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Returns a copy with a trimmed name after checking every field.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "must not be blank"));
        }
        validate_date_range(&self.start_date, &self.end_date)?;
        Ok(Self {
            name: name.to_string(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        })
    }
}

/// Stored planned hours for one employee, plan and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDayEntry {
    pub calendar_date: String,
    pub employee_id: EmployeeId,
    pub plan_id: PlanId,
    pub planned_hours: f64,
    pub description: String,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// New values for one existing plan-day entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDayUpdate {
    pub hours: f64,
    #[serde(default)]
    pub description: String,
}

impl PlanDayUpdate {
    pub fn new(hours: f64, description: impl Into<String>) -> Self {
        Self {
            hours,
            description: description.into(),
        }
    }

    pub fn hours(hours: f64) -> Self {
        Self::new(hours, "")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.hours.is_finite() || self.hours < 0.0 {
            return Err(ValidationError::new(
                "hours",
                format!("must be a non-negative number, got {}", self.hours),
            ));
        }
        Ok(())
    }
}
