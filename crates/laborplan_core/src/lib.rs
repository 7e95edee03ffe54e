//! Fiscal calendar and labor-plan aggregation engine.
//! This crate is the single source of truth for calendar and plan invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::calendar::{
    CalendarDay, CalendarDayImport, CalendarViewDay, PeriodView,
};
pub use model::fiscal::{period_display_name, FiscalPeriodSummary};
pub use model::plan::{NewPlan, Plan, PlanDayEntry, PlanDayUpdate};
pub use model::table::{PeriodHours, TableRow};
pub use model::{EmployeeId, PlanId, ValidationError};
pub use repo::calendar_repo::{CalendarRepository, SqliteCalendarRepository};
pub use repo::plan_day_repo::{Assignment, PlanDayRepository, SqlitePlanDayRepository};
pub use repo::plan_repo::{PlanRepository, SqlitePlanRepository};
pub use repo::{ErrorKind, RepoError, RepoResult};
pub use service::calendar_service::CalendarService;
pub use service::fiscal_service::{summarize_periods, FiscalService};
pub use service::plan_service::{PlanMatrixService, PlanService};
pub use service::pop_filter::{apply_pop_filter, PopWindow};
pub use service::table_service::TableService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
