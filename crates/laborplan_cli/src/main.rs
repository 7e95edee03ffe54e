//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `laborplan_core` linkage.
//! - Print fiscal summaries and period views from a configured database.
//!
//! Usage:
//! - `laborplan_cli` prints the core version.
//! - `laborplan_cli periods <start> <end>`
//! - `laborplan_cli view <pop_start> <pop_end> <fiscal_period>`
//!
//! The database path and logging come from `LABORPLAN_*` variables.

use laborplan_core::{
    core_version, summarize_periods, CalendarService, CoreConfig, SqliteCalendarRepository,
};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let Some(command) = args.first() else {
        println!("laborplan_core version={}", core_version());
        return Ok(());
    };

    let config = CoreConfig::from_env();
    config.init_logging()?;

    match (command.as_str(), &args[1..]) {
        ("periods", [start, end]) => {
            let conn = config.open_db().map_err(|err| err.to_string())?;
            let calendar = SqliteCalendarRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let summaries =
                summarize_periods(&calendar, start, end).map_err(|err| err.to_string())?;
            for summary in summaries {
                println!(
                    "{}\t{}\t{}..{}\t{:.2}",
                    summary.fiscal_period,
                    summary.display_name,
                    summary.range_start,
                    summary.range_end,
                    summary.total_standard_hours
                );
            }
            Ok(())
        }
        ("view", [pop_start, pop_end, fiscal_period]) => {
            let conn = config.open_db().map_err(|err| err.to_string())?;
            let calendar = SqliteCalendarRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let view = CalendarService::new(calendar)
                .period_view(pop_start, pop_end, fiscal_period)
                .map_err(|err| err.to_string())?;
            println!("{}", view.title);
            for day in view.days {
                let marker = if day.disabled { "-" } else { " " };
                println!(
                    "{marker} {:>2} {} {:.2}",
                    day.day_num, day.calendar_date, day.standard_hours
                );
            }
            Ok(())
        }
        _ => Err(format!(
            "unrecognized arguments `{}`; expected `periods <start> <end>` or `view <pop_start> <pop_end> <fiscal_period>`",
            args.join(" ")
        )),
    }
}
