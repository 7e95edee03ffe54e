use chrono::{Datelike, NaiveDate, Weekday};
use laborplan_core::db::open_db_in_memory;
use laborplan_core::{
    period_display_name, summarize_periods, CalendarDayImport, CalendarRepository, ErrorKind,
    FiscalService, SqliteCalendarRepository,
};
use rusqlite::Connection;

fn seed_business_calendar(conn: &Connection, start: &str, end: &str) {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap();
    let rows = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let hours = match date.weekday() {
                Weekday::Sat | Weekday::Sun => 0.0,
                _ => 8.0,
            };
            CalendarDayImport::new(
                date.format("%Y-%m-%d").to_string(),
                date.year(),
                date.month(),
                hours,
            )
            .unwrap()
        })
        .collect::<Vec<_>>();
    SqliteCalendarRepository::try_new(conn)
        .unwrap()
        .import_days(&rows)
        .unwrap();
}

#[test]
fn october_2024_sums_business_days() {
    let conn = open_db_in_memory().unwrap();
    seed_business_calendar(&conn, "2024-09-01", "2024-12-31");
    let service = FiscalService::new(SqliteCalendarRepository::try_new(&conn).unwrap());

    let summaries = service.summarize_periods("2024-10-01", "2024-10-31").unwrap();
    assert_eq!(summaries.len(), 1);
    let october = &summaries[0];
    assert_eq!(october.fiscal_period, "202410");
    assert_eq!(october.display_name, "Oct-2024");
    assert_eq!(october.range_start, "2024-10-01");
    assert_eq!(october.range_end, "2024-10-31");
    assert_eq!(october.total_standard_hours, 184.0);
}

#[test]
fn partially_covered_periods_are_summarized_whole() {
    let conn = open_db_in_memory().unwrap();
    seed_business_calendar(&conn, "2024-09-01", "2024-12-31");
    let calendar = SqliteCalendarRepository::try_new(&conn).unwrap();

    let summaries = summarize_periods(&calendar, "2024-10-15", "2024-11-05").unwrap();
    let spans = summaries
        .iter()
        .map(|summary| {
            (
                summary.display_name.as_str(),
                summary.range_start.as_str(),
                summary.range_end.as_str(),
                summary.total_standard_hours,
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        spans,
        vec![
            ("Oct-2024", "2024-10-01", "2024-10-31", 184.0),
            ("Nov-2024", "2024-11-01", "2024-11-30", 168.0),
        ]
    );
}

#[test]
fn summaries_are_ordered_across_fiscal_years() {
    let conn = open_db_in_memory().unwrap();
    seed_business_calendar(&conn, "2024-11-01", "2025-02-28");
    let calendar = SqliteCalendarRepository::try_new(&conn).unwrap();

    let names = summarize_periods(&calendar, "2024-11-20", "2025-02-10")
        .unwrap()
        .into_iter()
        .map(|summary| summary.display_name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Nov-2024", "Dec-2024", "Jan-2025", "Feb-2025"]);
}

#[test]
fn fiscal_labels_drive_grouping_not_calendar_months() {
    let conn = open_db_in_memory().unwrap();
    let calendar = SqliteCalendarRepository::try_new(&conn).unwrap();
    // Fiscal 2025 opens on 2024-09-29; the last days of September belong to
    // fiscal month 1.
    let rows = [
        ("2024-09-27", 2024, 12),
        ("2024-09-28", 2024, 12),
        ("2024-09-29", 2025, 1),
        ("2024-09-30", 2025, 1),
        ("2024-10-01", 2025, 1),
    ]
    .into_iter()
    .map(|(date, year, month)| CalendarDayImport::new(date, year, month, 8.0).unwrap())
    .collect::<Vec<_>>();
    calendar.import_days(&rows).unwrap();

    let summaries = summarize_periods(&calendar, "2024-09-30", "2024-09-30").unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].fiscal_period, "202501");
    assert_eq!(summaries[0].display_name, "Jan-2025");
    assert_eq!(summaries[0].range_start, "2024-09-29");
    assert_eq!(summaries[0].range_end, "2024-10-01");
    assert_eq!(summaries[0].total_standard_hours, 24.0);
}

#[test]
fn range_outside_calendar_yields_no_summaries() {
    let conn = open_db_in_memory().unwrap();
    seed_business_calendar(&conn, "2024-10-01", "2024-10-31");
    let calendar = SqliteCalendarRepository::try_new(&conn).unwrap();

    assert!(summarize_periods(&calendar, "2030-01-01", "2030-12-31")
        .unwrap()
        .is_empty());
    assert_eq!(
        summarize_periods(&calendar, "2024-10-31", "2024-10-01")
            .unwrap_err()
            .kind(),
        ErrorKind::Validation
    );
}

#[test]
fn display_name_rejects_out_of_range_months() {
    assert_eq!(period_display_name(2024, 10).unwrap(), "Oct-2024");
    assert!(period_display_name(2024, 0).is_err());
    assert!(period_display_name(2024, 13).is_err());
}

#[test]
fn summary_serializes_with_stable_field_names() {
    let conn = open_db_in_memory().unwrap();
    seed_business_calendar(&conn, "2024-10-01", "2024-10-31");
    let calendar = SqliteCalendarRepository::try_new(&conn).unwrap();

    let summaries = summarize_periods(&calendar, "2024-10-01", "2024-10-01").unwrap();
    let json = serde_json::to_value(&summaries[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "fiscal_period": "202410",
            "display_name": "Oct-2024",
            "range_start": "2024-10-01",
            "range_end": "2024-10-31",
            "total_standard_hours": 184.0
        })
    );
}
