//! Domain model for fiscal calendars and labor plans.
//!
//! # Responsibility
//! - Define the records shared by repositories and services.
//! - Own pure validation helpers for dates, fiscal periods and inputs.
//!
//! # Invariants
//! - Dates are canonical `YYYY-MM-DD` strings, so string order is calendar
//!   order.
//! - A fiscal period key is a pure function of fiscal year and month.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod calendar;
pub mod fiscal;
pub mod plan;
pub mod table;

/// Employee identity owned by the surrounding application.
pub type EmployeeId = i64;
/// Plan surrogate id.
pub type PlanId = i64;

/// Rejected caller input.
///
/// `field` names the offending argument so callers can point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}
