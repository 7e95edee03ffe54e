use chrono::{Datelike, NaiveDate};
use laborplan_core::db::{open_db, open_db_in_memory};
use laborplan_core::{
    CalendarDayImport, CalendarRepository, ErrorKind, NewPlan, PlanDayUpdate, PlanMatrixService,
    PlanService, RepoError, SqliteCalendarRepository, SqlitePlanDayRepository,
    SqlitePlanRepository,
};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::Barrier;
use std::thread;

fn seed_calendar(conn: &Connection, start: &str, end: &str) {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap();
    let rows = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            CalendarDayImport::new(
                date.format("%Y-%m-%d").to_string(),
                date.year(),
                date.month(),
                8.0,
            )
            .unwrap()
        })
        .collect::<Vec<_>>();
    SqliteCalendarRepository::try_new(conn)
        .unwrap()
        .import_days(&rows)
        .unwrap();
}

fn insert_employee(conn: &Connection, display_name: &str) -> i64 {
    conn.execute(
        "INSERT INTO employees (display_name) VALUES (?1);",
        params![display_name],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn create_plan(conn: &Connection, name: &str) -> i64 {
    let service = PlanService::new(SqlitePlanRepository::try_new(conn).unwrap());
    service
        .create_plan(&NewPlan::new(name, "2025-01-01", "2025-12-31"))
        .unwrap()
        .id
}

fn matrix(
    conn: &Connection,
) -> PlanMatrixService<SqliteCalendarRepository<'_>, SqlitePlanDayRepository<'_>> {
    PlanMatrixService::new(
        SqliteCalendarRepository::try_new(conn).unwrap(),
        SqlitePlanDayRepository::try_new(conn).unwrap(),
    )
}

fn plan_day_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM plan_days;", [], |row| row.get(0))
        .unwrap()
}

fn hours(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(date, value)| (date.to_string(), *value))
        .collect()
}

#[test]
fn initialize_range_creates_one_zeroed_entry_per_calendar_day() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2024-12-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);

    let created = matrix
        .initialize_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();
    assert_eq!(created, 3);
    assert_eq!(plan_day_count(&conn), 3);

    let range = matrix
        .get_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();
    assert_eq!(
        range,
        hours(&[("2025-01-01", 0.0), ("2025-01-02", 0.0), ("2025-01-03", 0.0)])
    );
}

#[test]
fn initialize_range_covers_large_ranges_in_one_call() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2024-01-01", "2025-12-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);

    let created = matrix
        .initialize_range(employee, plan, "2024-01-01", "2025-12-31")
        .unwrap();
    assert_eq!(created, 366 + 365);
    assert_eq!(plan_day_count(&conn), 731);
}

#[test]
fn repeated_initialize_is_conflict_and_adds_nothing() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);

    matrix
        .initialize_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();

    let err = matrix
        .initialize_range(employee, plan, "2025-01-01", "2025-01-05")
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(plan_day_count(&conn), 3);
}

#[test]
fn initialize_range_requires_existing_employee_and_plan() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);

    let missing_employee = matrix
        .initialize_range(employee + 100, plan, "2025-01-01", "2025-01-03")
        .unwrap_err();
    assert_eq!(missing_employee.kind(), ErrorKind::NotFound);

    let missing_plan = matrix
        .initialize_range(employee, plan + 100, "2025-01-01", "2025-01-03")
        .unwrap_err();
    assert_eq!(missing_plan.kind(), ErrorKind::NotFound);

    let empty_range = matrix
        .initialize_range(employee, plan, "2026-01-01", "2026-01-03")
        .unwrap_err();
    assert_eq!(empty_range.kind(), ErrorKind::Validation);

    assert_eq!(plan_day_count(&conn), 0);
}

#[test]
fn get_range_zero_fills_days_without_entries() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);

    matrix
        .initialize_range(employee, plan, "2025-01-02", "2025-01-02")
        .unwrap();
    let updates = BTreeMap::from([("2025-01-02".to_string(), PlanDayUpdate::hours(6.5))]);
    assert_eq!(matrix.update_batch(employee, plan, &updates).unwrap(), 1);

    let range = matrix
        .get_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();
    assert_eq!(
        range,
        hours(&[("2025-01-01", 0.0), ("2025-01-02", 6.5), ("2025-01-03", 0.0)])
    );

    let outside = matrix
        .get_range(employee, plan, "2030-01-01", "2030-01-03")
        .unwrap();
    assert!(outside.is_empty());
}

#[test]
fn update_batch_writes_hours_description_and_timestamp() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);
    matrix
        .initialize_range(employee, plan, "2025-01-01", "2025-01-05")
        .unwrap();
    conn.execute("UPDATE plan_days SET updated_at = 0;", []).unwrap();

    let updates = BTreeMap::from([
        (
            "2025-01-02".to_string(),
            PlanDayUpdate::new(4.0, "design review"),
        ),
        ("2025-01-03".to_string(), PlanDayUpdate::hours(7.5)),
    ]);
    assert_eq!(matrix.update_batch(employee, plan, &updates).unwrap(), 2);

    let entry = matrix
        .get_entry("2025-01-02", employee, plan)
        .unwrap()
        .unwrap();
    assert_eq!(entry.planned_hours, 4.0);
    assert_eq!(entry.description, "design review");
    assert!(entry.updated_at > 0);

    let untouched = matrix
        .get_entry("2025-01-04", employee, plan)
        .unwrap()
        .unwrap();
    assert_eq!(untouched.planned_hours, 0.0);
    assert_eq!(untouched.updated_at, 0);
}

#[test]
fn update_batch_with_missing_entry_rolls_back_everything() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);
    matrix
        .initialize_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();

    let updates = BTreeMap::from([
        ("2025-01-01".to_string(), PlanDayUpdate::hours(8.0)),
        ("2025-01-20".to_string(), PlanDayUpdate::hours(8.0)),
    ]);
    let err = matrix.update_batch(employee, plan, &updates).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let range = matrix
        .get_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();
    assert!(range.values().all(|value| *value == 0.0));
    assert!(matrix
        .get_entry("2025-01-20", employee, plan)
        .unwrap()
        .is_none());
}

#[test]
fn update_batch_validates_before_writing() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);
    matrix
        .initialize_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();

    let negative = BTreeMap::from([("2025-01-01".to_string(), PlanDayUpdate::hours(-1.0))]);
    assert_eq!(
        matrix.update_batch(employee, plan, &negative).unwrap_err().kind(),
        ErrorKind::Validation
    );

    let bad_date = BTreeMap::from([("01/02/2025".to_string(), PlanDayUpdate::hours(1.0))]);
    assert_eq!(
        matrix.update_batch(employee, plan, &bad_date).unwrap_err().kind(),
        ErrorKind::Validation
    );

    assert_eq!(matrix.update_batch(employee, plan, &BTreeMap::new()).unwrap(), 0);
}

#[test]
fn delete_assignment_removes_only_the_pair() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let ada = insert_employee(&conn, "Ada Lovelace");
    let grace = insert_employee(&conn, "Grace Hopper");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);
    matrix
        .initialize_range(ada, plan, "2025-01-01", "2025-01-10")
        .unwrap();
    matrix
        .initialize_range(grace, plan, "2025-01-01", "2025-01-05")
        .unwrap();

    assert_eq!(matrix.delete_assignment(ada, plan).unwrap(), 10);
    assert_eq!(matrix.delete_assignment(ada, plan).unwrap(), 0);
    assert_eq!(plan_day_count(&conn), 5);

    // The pair can be initialized again once cleared.
    assert_eq!(
        matrix
            .initialize_range(ada, plan, "2025-01-01", "2025-01-02")
            .unwrap(),
        2
    );
}

#[test]
fn delete_entry_reports_whether_a_row_existed() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-31");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);
    matrix
        .initialize_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();

    assert!(matrix.delete_entry("2025-01-02", employee, plan).unwrap());
    assert!(!matrix.delete_entry("2025-01-02", employee, plan).unwrap());
    assert_eq!(plan_day_count(&conn), 2);

    let range = matrix
        .get_range(employee, plan, "2025-01-01", "2025-01-03")
        .unwrap();
    assert_eq!(range.len(), 3);
    assert_eq!(range["2025-01-02"], 0.0);
}

#[test]
fn plans_are_unique_by_name_and_listed_alphabetically() {
    let conn = open_db_in_memory().unwrap();
    let service = PlanService::new(SqlitePlanRepository::try_new(&conn).unwrap());

    let zephyr = service
        .create_plan(&NewPlan::new("  Zephyr ", "2025-01-01", "2025-06-30"))
        .unwrap();
    assert_eq!(zephyr.name, "Zephyr");
    service
        .create_plan(&NewPlan::new("Apollo", "2025-01-01", "2025-12-31"))
        .unwrap();

    let duplicate = service
        .create_plan(&NewPlan::new("Zephyr", "2025-02-01", "2025-03-01"))
        .unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::Conflict);

    let reversed = service
        .create_plan(&NewPlan::new("Hermes", "2025-03-01", "2025-02-01"))
        .unwrap_err();
    assert_eq!(reversed.kind(), ErrorKind::Validation);

    let blank = service
        .create_plan(&NewPlan::new("   ", "2025-01-01", "2025-02-01"))
        .unwrap_err();
    assert_eq!(blank.kind(), ErrorKind::Validation);

    let names = service
        .list_plans()
        .unwrap()
        .into_iter()
        .map(|plan| plan.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Apollo", "Zephyr"]);

    assert_eq!(service.get_plan(zephyr.id).unwrap(), Some(zephyr));
    assert_eq!(service.get_plan(9_999).unwrap(), None);
}

#[test]
fn calendar_import_is_visible_to_matrix_reads() {
    let conn = open_db_in_memory().unwrap();
    seed_calendar(&conn, "2025-01-01", "2025-01-02");
    let employee = insert_employee(&conn, "Ada Lovelace");
    let plan = create_plan(&conn, "Apollo");
    let matrix = matrix(&conn);

    seed_calendar(&conn, "2025-01-03", "2025-01-04");
    let calendar = SqliteCalendarRepository::try_new(&conn).unwrap();
    assert_eq!(
        calendar.last_day().unwrap().unwrap().calendar_date,
        "2025-01-04"
    );
    let range = matrix
        .get_range(employee, plan, "2025-01-01", "2025-01-04")
        .unwrap();
    assert_eq!(range.len(), 4);
}

#[test]
fn concurrent_initialize_has_exactly_one_winner() {
    const WORKERS: usize = 4;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("laborplan.db");
    let (employee, plan) = {
        let conn = open_db(&path).unwrap();
        seed_calendar(&conn, "2024-01-01", "2025-06-30");
        (insert_employee(&conn, "Ada Lovelace"), create_plan(&conn, "Apollo"))
    };

    let barrier = Barrier::new(WORKERS);
    let results = thread::scope(|scope| {
        let workers = (0..WORKERS)
            .map(|_| {
                scope.spawn(|| {
                    let conn = open_db(&path).unwrap();
                    let matrix = matrix(&conn);
                    barrier.wait();
                    matrix
                        .initialize_range(employee, plan, "2024-01-01", "2025-06-30")
                        .map_err(|err| err.kind())
                })
            })
            .collect::<Vec<_>>();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect::<Vec<_>>()
    });

    let created = results
        .iter()
        .filter_map(|result| result.as_ref().ok().copied())
        .collect::<Vec<_>>();
    assert_eq!(created, vec![366 + 181], "results: {results:?}");
    assert_eq!(
        results
            .iter()
            .filter(|result| **result == Err(ErrorKind::Conflict))
            .count(),
        WORKERS - 1,
        "results: {results:?}"
    );

    let conn = open_db(&path).unwrap();
    assert_eq!(plan_day_count(&conn), 366 + 181);
}
