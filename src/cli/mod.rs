//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Handlers receive
//! the current time from `main` so a whole command sees one "now".

pub mod calendar;
pub mod expense;
pub mod plan;
pub mod recurring;

pub use calendar::{handle_calendar_command, handle_materialize_command, handle_today_command};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use plan::{handle_plan_command, PlanCommands};
pub use recurring::{handle_recurring_command, RecurringCommands};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{SpendError, SpendResult};
use crate::models::Money;

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> SpendResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| SpendError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s)))
}

/// Parse a date with optional time (`YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or
/// `YYYY-MM-DDTHH:MM:SS`); a bare date means midnight
pub fn parse_instant(s: &str) -> SpendResult<NaiveDateTime> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(instant);
        }
    }

    parse_date(s)?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| SpendError::Validation(format!("Invalid date '{}'", s)))
}

/// Parse a `YYYY-MM` month
pub fn parse_month(s: &str) -> SpendResult<(i32, u32)> {
    let invalid = || SpendError::Validation(format!("Invalid month '{}'. Use YYYY-MM", s));

    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Parse a whole-unit amount
pub fn parse_amount(s: &str) -> SpendResult<Money> {
    Money::parse(s).map_err(|e| SpendError::Validation(format!("Invalid amount: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_formats() {
        let midnight = parse_instant("2025-03-09").unwrap();
        assert_eq!(midnight.to_string(), "2025-03-09 00:00:00");

        let with_time = parse_instant("2025-03-09 18:30").unwrap();
        assert_eq!(with_time.to_string(), "2025-03-09 18:30:00");

        assert!(parse_instant("09/03/2025").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-02").unwrap(), (2025, 2));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("February").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250").unwrap().units(), 1250);
        assert!(parse_amount("12.50").is_err());
    }
}
