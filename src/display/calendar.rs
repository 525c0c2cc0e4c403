//! Calendar display formatting
//!
//! Renders a month grid as a seven-column table. Each day takes two lines:
//! the day number with a status marker, then the day's closing balance.

use chrono::{Datelike, Weekday};

use crate::engine::{CalendarCell, DayStatus, MonthGrid};

const CELL_WIDTH: usize = 8;

/// Marker shown next to the day number
fn status_marker(status: DayStatus) -> char {
    match status {
        DayStatus::SpendSuccess => '+',
        DayStatus::SpendFail => '!',
        DayStatus::Future => '.',
        DayStatus::NoPlan => ' ',
    }
}

fn weekday_headers(week_start: Weekday) -> Vec<String> {
    let mut day = week_start;
    let mut headers = Vec::with_capacity(7);
    for _ in 0..7 {
        headers.push(day.to_string());
        day = day.succ();
    }
    headers
}

/// Format a month grid for the terminal
pub fn format_month_grid(grid: &MonthGrid, symbol: &str) -> String {
    let mut output = String::new();
    let title = grid.first_day().format("%B %Y").to_string();
    output.push_str(&format!("{:^width$}\n", title, width = CELL_WIDTH * 7));

    for header in weekday_headers(grid.week_start) {
        output.push_str(&format!("{:<width$}", header, width = CELL_WIDTH));
    }
    output.push('\n');

    for week in grid.weeks() {
        let mut days_line = String::new();
        let mut balance_line = String::new();

        for cell in week {
            match cell {
                CalendarCell::Padding => {
                    days_line.push_str(&" ".repeat(CELL_WIDTH));
                    balance_line.push_str(&" ".repeat(CELL_WIDTH));
                }
                CalendarCell::Day(day) => {
                    let today = if day.is_today { '*' } else { ' ' };
                    let label = format!("{}{:>2}{}", today, day.date.day(), status_marker(day.status));
                    days_line.push_str(&format!("{:<width$}", label, width = CELL_WIDTH));

                    let balance = if day.has_plan() {
                        day.balance.format_with_symbol(symbol)
                    } else {
                        String::new()
                    };
                    balance_line.push_str(&format!("{:<width$}", balance, width = CELL_WIDTH));
                }
            }
        }

        output.push_str(days_line.trim_end());
        output.push('\n');
        output.push_str(balance_line.trim_end());
        output.push('\n');
    }

    output.push_str("\n+ on track  ! over budget  . upcoming  * today\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_month_grid;
    use crate::models::{Money, Plan};
    use chrono::NaiveDate;

    #[test]
    fn test_month_grid_layout() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let plans = vec![Plan::new("June", start, end, Money::from_units(100), Money::zero())];
        let now = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap().and_hms_opt(12, 0, 0).unwrap();

        let grid = compute_month_grid(2025, 6, &plans, &[], now, Weekday::Sun).unwrap();
        let output = format_month_grid(&grid, "$");
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].contains("June 2025"));
        assert!(lines[1].starts_with("Sun"));
        // June 1st 2025 is a Sunday, so the first row starts with day 1.
        assert!(lines[2].starts_with("  1+"));
        assert!(lines[2].contains("* 3+"));
        assert!(lines[2].contains(" 4."));
        assert!(lines[3].starts_with("$10"));
        assert!(output.contains("30"));
    }

    #[test]
    fn test_monday_start_headers() {
        let headers = weekday_headers(Weekday::Mon);
        assert_eq!(headers.first().map(String::as_str), Some("Mon"));
        assert_eq!(headers.last().map(String::as_str), Some("Sun"));
    }
}
