//! Plan repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Plan names are unique; duplicates surface as `RepoError::Conflict`.
//! - Plans are never deleted by the engine.

use super::{conflict_or_db, ensure_schema_ready, RepoResult};
use crate::model::plan::{NewPlan, Plan};
use crate::model::PlanId;
use rusqlite::{params, Connection, Row};

const PLAN_SELECT_SQL: &str = "SELECT id, name, start_date, end_date FROM plans";

/// Repository interface for plans.
pub trait PlanRepository {
    fn create_plan(&self, plan: &NewPlan) -> RepoResult<PlanId>;
    fn get_plan(&self, id: PlanId) -> RepoResult<Option<Plan>>;
    /// All plans ordered by name.
    fn list_plans(&self) -> RepoResult<Vec<Plan>>;
}

/// SQLite-backed plan repository.
#[derive(Clone, Copy)]
pub struct SqlitePlanRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlanRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["plans"])?;
        Ok(Self { conn })
    }
}

impl PlanRepository for SqlitePlanRepository<'_> {
    fn create_plan(&self, plan: &NewPlan) -> RepoResult<PlanId> {
        let plan = plan.normalized()?;

        self.conn
            .execute(
                "INSERT INTO plans (name, start_date, end_date) VALUES (?1, ?2, ?3);",
                params![
                    plan.name.as_str(),
                    plan.start_date.as_str(),
                    plan.end_date.as_str(),
                ],
            )
            .map_err(|err| conflict_or_db(err, || format!("plan name `{}` already exists", plan.name)))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_plan(&self, id: PlanId) -> RepoResult<Option<Plan>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLAN_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_plan_row(row)?));
        }
        Ok(None)
    }

    fn list_plans(&self) -> RepoResult<Vec<Plan>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLAN_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut plans = Vec::new();
        while let Some(row) = rows.next()? {
            plans.push(parse_plan_row(row)?);
        }
        Ok(plans)
    }
}

fn parse_plan_row(row: &Row<'_>) -> RepoResult<Plan> {
    Ok(Plan {
        id: row.get("id")?,
        name: row.get("name")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
    })
}
