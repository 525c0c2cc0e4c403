//! Calendar, today and materialize commands

use chrono::{Datelike, NaiveDateTime};

use super::parse_month;
use crate::config::settings::Settings;
use crate::display::calendar::format_month_grid;
use crate::display::plan::format_focus;
use crate::display::recurring::format_materialize_report;
use crate::error::SpendResult;
use crate::services::{PlanService, RecurringService};
use crate::storage::Storage;

/// Print the month grid (`--month YYYY-MM`, default: current month)
pub fn handle_calendar_command(
    storage: &Storage,
    settings: &Settings,
    month: Option<String>,
    json: bool,
    now: NaiveDateTime,
) -> SpendResult<()> {
    let (year, month) = match month {
        Some(month) => parse_month(&month)?,
        None => (now.year(), now.month()),
    };

    let grid = PlanService::new(storage).month_grid(year, month, now, settings.week_start())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
    } else {
        print!("{}", format_month_grid(&grid, &settings.currency_symbol));
    }
    Ok(())
}

/// Print the focus summary for today
pub fn handle_today_command(
    storage: &Storage,
    settings: &Settings,
    json: bool,
    now: NaiveDateTime,
) -> SpendResult<()> {
    let focus = PlanService::new(storage).focus(now)?;

    match (focus, json) {
        (Some(focus), true) => println!("{}", serde_json::to_string_pretty(&focus)?),
        (Some(focus), false) => print!("{}", format_focus(&focus, &settings.currency_symbol)),
        (None, true) => println!("null"),
        (None, false) => {
            println!("No plans yet. Create one with 'spendwise plan add <name> --budget <amount>'.")
        }
    }
    Ok(())
}

/// Run the recurring batch and print the report
pub fn handle_materialize_command(storage: &Storage, now: NaiveDateTime) -> SpendResult<()> {
    let report = RecurringService::new(storage).materialize_all(now)?;
    print!("{}", format_materialize_report(&report));
    Ok(())
}
