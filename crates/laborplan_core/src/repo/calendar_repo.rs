//! Calendar day repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append fiscal calendar rows in chronological order.
//! - Serve ordered date lists, period lookups and per-period rollups.
//!
//! # Invariants
//! - Stored days are contiguous; every import continues from the last
//!   stored day, so `id` order equals `cal_date` order.
//! - Readers never reorder by anything but calendar date.

use super::{conflict_or_db, ensure_schema_ready, placeholders, RepoError, RepoResult};
use crate::model::calendar::{parse_iso_date, CalendarDay, CalendarDayImport};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const CALENDAR_SELECT_SQL: &str = "SELECT
    id,
    cal_date,
    fiscal_year,
    fiscal_month,
    fiscal_period,
    standard_hours
FROM calendar_days";

/// Surrogate id resolved for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayRef {
    pub id: i64,
    pub calendar_date: String,
}

/// Raw aggregate for one fiscal period, before display formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodRollup {
    pub fiscal_year: i32,
    pub fiscal_month: u32,
    pub fiscal_period: String,
    pub range_start: String,
    pub range_end: String,
    pub total_standard_hours: f64,
}

/// Repository interface for the fiscal calendar.
pub trait CalendarRepository {
    /// Appends days in one transaction and returns the inserted count.
    fn import_days(&self, days: &[CalendarDayImport]) -> RepoResult<usize>;
    /// Most recent stored day, if any; imports continue from it.
    fn last_day(&self) -> RepoResult<Option<CalendarDay>>;
    /// Dates in `[start, end]`, ascending.
    fn list_dates(&self, start: &str, end: &str) -> RepoResult<Vec<String>>;
    /// Full rows in `[start, end]`, ascending.
    fn days_in_range(&self, start: &str, end: &str) -> RepoResult<Vec<CalendarDay>>;
    /// Rows labelled with `fiscal_period`, ascending.
    fn days_in_period(&self, fiscal_period: &str) -> RepoResult<Vec<CalendarDay>>;
    /// Resolves ids for the given dates with one query, ordered by id.
    fn resolve_day_refs(&self, dates: &[&str]) -> RepoResult<Vec<CalendarDayRef>>;
    /// Whole-period rollups for every period touching `[start, end]`,
    /// ordered by `(fiscal_year, fiscal_month)`.
    fn period_rollups(&self, start: &str, end: &str) -> RepoResult<Vec<PeriodRollup>>;
}

/// SQLite-backed calendar repository.
#[derive(Clone, Copy)]
pub struct SqliteCalendarRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCalendarRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["calendar_days"])?;
        Ok(Self { conn })
    }
}

impl CalendarRepository for SqliteCalendarRepository<'_> {
    fn import_days(&self, days: &[CalendarDayImport]) -> RepoResult<usize> {
        if days.is_empty() {
            return Ok(0);
        }

        let mut parsed = Vec::with_capacity(days.len());
        for day in days {
            parsed.push(day.validate()?);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut previous = self
            .last_day()?
            .map(|day| stored_date(&day.calendar_date))
            .transpose()?;
        for (day, date) in days.iter().zip(&parsed) {
            if let Some(previous) = previous {
                if previous.succ_opt() != Some(*date) {
                    return Err(RepoError::validation(
                        "calendar_date",
                        format!(
                            "`{}` must be the day after `{previous}`; calendar days are appended contiguously",
                            day.calendar_date
                        ),
                    ));
                }
            }
            previous = Some(*date);
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO calendar_days (
                    cal_date,
                    fiscal_year,
                    fiscal_month,
                    fiscal_period,
                    standard_hours
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for day in days {
                stmt.execute(params![
                    day.calendar_date.as_str(),
                    day.fiscal_year,
                    day.fiscal_month,
                    day.fiscal_period.as_str(),
                    day.standard_hours,
                ])
                .map_err(|err| {
                    conflict_or_db(err, || format!("calendar day {}", day.calendar_date))
                })?;
            }
        }

        tx.commit()?;
        Ok(days.len())
    }

    fn last_day(&self) -> RepoResult<Option<CalendarDay>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CALENDAR_SELECT_SQL} ORDER BY id DESC LIMIT 1;"))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_calendar_day_row(row)?));
        }
        Ok(None)
    }

    fn list_dates(&self, start: &str, end: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT cal_date
             FROM calendar_days
             WHERE cal_date BETWEEN ?1 AND ?2
             ORDER BY cal_date ASC;",
        )?;
        let mut rows = stmt.query(params![start, end])?;
        let mut dates = Vec::new();
        while let Some(row) = rows.next()? {
            dates.push(row.get(0)?);
        }
        Ok(dates)
    }

    fn days_in_range(&self, start: &str, end: &str) -> RepoResult<Vec<CalendarDay>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CALENDAR_SELECT_SQL}
             WHERE cal_date BETWEEN ?1 AND ?2
             ORDER BY cal_date ASC;"
        ))?;
        let mut rows = stmt.query(params![start, end])?;
        let mut days = Vec::new();
        while let Some(row) = rows.next()? {
            days.push(parse_calendar_day_row(row)?);
        }
        Ok(days)
    }

    fn days_in_period(&self, fiscal_period: &str) -> RepoResult<Vec<CalendarDay>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CALENDAR_SELECT_SQL}
             WHERE fiscal_period = ?1
             ORDER BY cal_date ASC;"
        ))?;
        let mut rows = stmt.query([fiscal_period])?;
        let mut days = Vec::new();
        while let Some(row) = rows.next()? {
            days.push(parse_calendar_day_row(row)?);
        }
        Ok(days)
    }

    fn resolve_day_refs(&self, dates: &[&str]) -> RepoResult<Vec<CalendarDayRef>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, cal_date
             FROM calendar_days
             WHERE cal_date IN ({})
             ORDER BY id ASC;",
            placeholders(dates.len())
        );
        let bind_values = dates
            .iter()
            .map(|date| Value::Text((*date).to_string()));
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut refs = Vec::new();
        while let Some(row) = rows.next()? {
            refs.push(CalendarDayRef {
                id: row.get("id")?,
                calendar_date: row.get("cal_date")?,
            });
        }
        Ok(refs)
    }

    fn period_rollups(&self, start: &str, end: &str) -> RepoResult<Vec<PeriodRollup>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                fiscal_year,
                fiscal_month,
                fiscal_period,
                MIN(cal_date) AS range_start,
                MAX(cal_date) AS range_end,
                TOTAL(standard_hours) AS total_standard_hours
             FROM calendar_days
             WHERE fiscal_period IN (
                SELECT DISTINCT fiscal_period
                FROM calendar_days
                WHERE cal_date BETWEEN ?1 AND ?2
             )
             GROUP BY fiscal_year, fiscal_month, fiscal_period
             ORDER BY fiscal_year ASC, fiscal_month ASC;",
        )?;
        let mut rows = stmt.query(params![start, end])?;
        let mut rollups = Vec::new();
        while let Some(row) = rows.next()? {
            rollups.push(PeriodRollup {
                fiscal_year: row.get("fiscal_year")?,
                fiscal_month: row.get("fiscal_month")?,
                fiscal_period: row.get("fiscal_period")?,
                range_start: row.get("range_start")?,
                range_end: row.get("range_end")?,
                total_standard_hours: row.get("total_standard_hours")?,
            });
        }
        Ok(rollups)
    }
}

fn stored_date(text: &str) -> RepoResult<NaiveDate> {
    parse_iso_date("calendar_date", text).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{text}` in calendar_days.cal_date"))
    })
}

fn parse_calendar_day_row(row: &Row<'_>) -> RepoResult<CalendarDay> {
    let fiscal_month: i64 = row.get("fiscal_month")?;
    let fiscal_month = u32::try_from(fiscal_month)
        .ok()
        .filter(|month| (1..=12).contains(month))
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid fiscal month `{fiscal_month}` in calendar_days.fiscal_month"
            ))
        })?;

    Ok(CalendarDay {
        id: row.get("id")?,
        calendar_date: row.get("cal_date")?,
        fiscal_year: row.get("fiscal_year")?,
        fiscal_month,
        fiscal_period: row.get("fiscal_period")?,
        standard_hours: row.get("standard_hours")?,
    })
}
