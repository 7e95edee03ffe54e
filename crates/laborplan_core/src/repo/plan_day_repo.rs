//! Plan-day repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the `(date, employee, plan)` grid of planned hours.
//! - Provide atomic bulk initialization and batch updates.
//! - Project grid rows into planning-table assignments.
//!
//! # Invariants
//! - `insert_zeroed` and `update_batch` commit everything or nothing.
//! - Updates never create rows; a missing row fails the whole batch.
//! - Range reads are zero-filled against `calendar_days`.

use super::{conflict_or_db, ensure_schema_ready, placeholders, RepoError, RepoResult};
use crate::model::calendar::parse_iso_date;
use crate::model::plan::{PlanDayEntry, PlanDayUpdate};
use crate::model::{EmployeeId, PlanId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

/// Rows per multi-row `INSERT`; three bound values each.
const INSERT_CHUNK_ROWS: usize = 256;

/// Distinct `(employee name, plan, hourly rate)` combination present in the
/// grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Lowest id of the group.
    pub employee_id: EmployeeId,
    /// Every requested employee sharing the name and rate, ascending.
    pub employee_ids: Vec<EmployeeId>,
    pub employee_name: String,
    pub plan_id: PlanId,
    pub plan_name: String,
    pub hourly_rate: Option<f64>,
}

/// Repository interface for plan-day grid operations.
pub trait PlanDayRepository {
    /// Inserts one zero-hour row per date for the pair; returns rows created.
    fn insert_zeroed(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        dates: &[String],
    ) -> RepoResult<usize>;
    /// Planned hours for every calendar date in `[start, end]`, zero-filled.
    fn planned_hours(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        start: &str,
        end: &str,
    ) -> RepoResult<BTreeMap<String, f64>>;
    /// Sum of stored planned hours of the employees on the plan within
    /// `[start, end]`.
    fn planned_total(
        &self,
        employee_ids: &[EmployeeId],
        plan_id: PlanId,
        start: &str,
        end: &str,
    ) -> RepoResult<f64>;
    fn get_entry(
        &self,
        calendar_date: &str,
        employee_id: EmployeeId,
        plan_id: PlanId,
    ) -> RepoResult<Option<PlanDayEntry>>;
    /// Applies every update in one transaction; returns rows touched.
    fn update_batch(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        updates: &BTreeMap<String, PlanDayUpdate>,
    ) -> RepoResult<usize>;
    /// Deletes all rows for the pair; returns rows removed.
    fn delete_assignment(&self, employee_id: EmployeeId, plan_id: PlanId) -> RepoResult<usize>;
    /// Deletes one row; returns whether it existed.
    fn delete_entry(
        &self,
        calendar_date: &str,
        employee_id: EmployeeId,
        plan_id: PlanId,
    ) -> RepoResult<bool>;
    /// Grid assignments grouped by employee name, plan name and hourly rate,
    /// ordered by employee name.
    fn list_assignments(
        &self,
        employee_ids: &[EmployeeId],
        plan_ids: &[PlanId],
    ) -> RepoResult<Vec<Assignment>>;
}

/// SQLite-backed plan-day repository.
#[derive(Clone, Copy)]
pub struct SqlitePlanDayRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlanDayRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(
            conn,
            &["plan_days", "calendar_days", "plans", "employees", "compensation"],
        )?;
        Ok(Self { conn })
    }
}

impl PlanDayRepository for SqlitePlanDayRepository<'_> {
    fn insert_zeroed(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        dates: &[String],
    ) -> RepoResult<usize> {
        for date in dates {
            parse_iso_date("calendar_date", date)?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_assignment_targets_exist(&tx, employee_id, plan_id)?;

        let mut inserted = 0;
        for chunk in dates.chunks(INSERT_CHUNK_ROWS) {
            let sql = format!(
                "INSERT INTO plan_days (cal_date, employee_id, plan_id) VALUES {};",
                vec!["(?, ?, ?)"; chunk.len()].join(", ")
            );
            let mut bind_values = Vec::with_capacity(chunk.len() * 3);
            for date in chunk {
                bind_values.push(Value::Text(date.clone()));
                bind_values.push(Value::Integer(employee_id));
                bind_values.push(Value::Integer(plan_id));
            }

            inserted += tx
                .prepare_cached(&sql)?
                .execute(params_from_iter(bind_values))
                .map_err(|err| {
                    conflict_or_db(err, || {
                        format!("employee {employee_id} is already planned on plan {plan_id}")
                    })
                })?;
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn planned_hours(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        start: &str,
        end: &str,
    ) -> RepoResult<BTreeMap<String, f64>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                c.cal_date AS cal_date,
                IFNULL(pd.planned_hours, 0.0) AS planned_hours
             FROM calendar_days c
             LEFT JOIN plan_days pd
                ON pd.cal_date = c.cal_date
               AND pd.employee_id = ?1
               AND pd.plan_id = ?2
             WHERE c.cal_date BETWEEN ?3 AND ?4
             ORDER BY c.cal_date ASC;",
        )?;
        let mut rows = stmt.query(params![employee_id, plan_id, start, end])?;
        let mut hours = BTreeMap::new();
        while let Some(row) = rows.next()? {
            hours.insert(row.get("cal_date")?, row.get("planned_hours")?);
        }
        Ok(hours)
    }

    fn planned_total(
        &self,
        employee_ids: &[EmployeeId],
        plan_id: PlanId,
        start: &str,
        end: &str,
    ) -> RepoResult<f64> {
        if employee_ids.is_empty() {
            return Ok(0.0);
        }

        let sql = format!(
            "SELECT TOTAL(planned_hours)
             FROM plan_days
             WHERE employee_id IN ({})
               AND plan_id = ?
               AND cal_date BETWEEN ? AND ?;",
            placeholders(employee_ids.len())
        );
        let bind_values = employee_ids
            .iter()
            .map(|id| Value::Integer(*id))
            .chain([
                Value::Integer(plan_id),
                Value::Text(start.to_string()),
                Value::Text(end.to_string()),
            ]);
        let total = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(total)
    }

    fn get_entry(
        &self,
        calendar_date: &str,
        employee_id: EmployeeId,
        plan_id: PlanId,
    ) -> RepoResult<Option<PlanDayEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                cal_date,
                employee_id,
                plan_id,
                planned_hours,
                description,
                updated_at
             FROM plan_days
             WHERE cal_date = ?1
               AND employee_id = ?2
               AND plan_id = ?3;",
        )?;
        let mut rows = stmt.query(params![calendar_date, employee_id, plan_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_plan_day_row(row)?));
        }
        Ok(None)
    }

    fn update_batch(
        &self,
        employee_id: EmployeeId,
        plan_id: PlanId,
        updates: &BTreeMap<String, PlanDayUpdate>,
    ) -> RepoResult<usize> {
        for (date, update) in updates {
            parse_iso_date("calendar_date", date)?;
            update.validate()?;
        }
        if updates.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "UPDATE plan_days
                 SET
                    planned_hours = ?1,
                    description = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE cal_date = ?3
                   AND employee_id = ?4
                   AND plan_id = ?5;",
            )?;
            for (date, update) in updates {
                let changed = stmt.execute(params![
                    update.hours,
                    update.description.as_str(),
                    date.as_str(),
                    employee_id,
                    plan_id,
                ])?;
                if changed == 0 {
                    return Err(RepoError::NotFound(format!(
                        "plan day {date} for employee {employee_id} on plan {plan_id}"
                    )));
                }
            }
        }
        tx.commit()?;

        Ok(updates.len())
    }

    fn delete_assignment(&self, employee_id: EmployeeId, plan_id: PlanId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM plan_days
             WHERE employee_id = ?1
               AND plan_id = ?2;",
            params![employee_id, plan_id],
        )?;
        Ok(removed)
    }

    fn delete_entry(
        &self,
        calendar_date: &str,
        employee_id: EmployeeId,
        plan_id: PlanId,
    ) -> RepoResult<bool> {
        parse_iso_date("calendar_date", calendar_date)?;
        let removed = self.conn.execute(
            "DELETE FROM plan_days
             WHERE cal_date = ?1
               AND employee_id = ?2
               AND plan_id = ?3;",
            params![calendar_date, employee_id, plan_id],
        )?;
        Ok(removed > 0)
    }

    fn list_assignments(
        &self,
        employee_ids: &[EmployeeId],
        plan_ids: &[PlanId],
    ) -> RepoResult<Vec<Assignment>> {
        if employee_ids.is_empty() {
            return Err(RepoError::validation("employee_ids", "must not be empty"));
        }
        if plan_ids.is_empty() {
            return Err(RepoError::validation("plan_ids", "must not be empty"));
        }

        let sql = format!(
            "SELECT
                MIN(e.id) AS employee_id,
                GROUP_CONCAT(DISTINCT e.id) AS employee_ids,
                e.display_name AS employee_name,
                MIN(p.id) AS plan_id,
                p.name AS plan_name,
                c.hourly_rate AS hourly_rate
             FROM plan_days pd
             INNER JOIN employees e ON e.id = pd.employee_id
             INNER JOIN plans p ON p.id = pd.plan_id
             LEFT JOIN compensation c ON c.id = e.compensation_id
             WHERE pd.employee_id IN ({})
               AND pd.plan_id IN ({})
             GROUP BY e.display_name, p.name, c.hourly_rate
             ORDER BY e.display_name ASC, p.name ASC, c.hourly_rate ASC;",
            placeholders(employee_ids.len()),
            placeholders(plan_ids.len())
        );
        let bind_values = employee_ids
            .iter()
            .chain(plan_ids)
            .map(|id| Value::Integer(*id));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            let merged_ids: String = row.get("employee_ids")?;
            assignments.push(Assignment {
                employee_id: row.get("employee_id")?,
                employee_ids: parse_id_list(&merged_ids)?,
                employee_name: row.get("employee_name")?,
                plan_id: row.get("plan_id")?,
                plan_name: row.get("plan_name")?,
                hourly_rate: row.get("hourly_rate")?,
            });
        }
        Ok(assignments)
    }
}

fn ensure_assignment_targets_exist(
    conn: &Connection,
    employee_id: EmployeeId,
    plan_id: PlanId,
) -> RepoResult<()> {
    let (employee_exists, plan_exists): (i64, i64) = conn.query_row(
        "SELECT
            EXISTS(SELECT 1 FROM employees WHERE id = ?1),
            EXISTS(SELECT 1 FROM plans WHERE id = ?2);",
        params![employee_id, plan_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    if employee_exists != 1 {
        return Err(RepoError::NotFound(format!("employee {employee_id}")));
    }
    if plan_exists != 1 {
        return Err(RepoError::NotFound(format!("plan {plan_id}")));
    }
    Ok(())
}

/// Parses a `GROUP_CONCAT` id list such as `3,1`, sorted ascending.
fn parse_id_list(value: &str) -> RepoResult<Vec<EmployeeId>> {
    let mut ids = value
        .split(',')
        .map(|part| {
            part.trim().parse::<EmployeeId>().map_err(|_| {
                RepoError::InvalidData(format!("invalid employee id list `{value}`"))
            })
        })
        .collect::<RepoResult<Vec<_>>>()?;
    ids.sort_unstable();
    Ok(ids)
}

fn parse_plan_day_row(row: &Row<'_>) -> RepoResult<PlanDayEntry> {
    Ok(PlanDayEntry {
        calendar_date: row.get("cal_date")?,
        employee_id: row.get("employee_id")?,
        plan_id: row.get("plan_id")?,
        planned_hours: row.get("planned_hours")?,
        description: row.get("description")?,
        updated_at: row.get("updated_at")?,
    })
}
