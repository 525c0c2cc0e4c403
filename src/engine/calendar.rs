//! Calendar aggregation
//!
//! Builds a month grid out of every plan that touches the month. Days outside
//! any plan become `NoPlan` placeholders, and the grid is padded at the front
//! so day 1 lines up with its weekday column.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use super::allocation::{compute_daily_allocations, DailyAllocation};
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, Plan, PlanId};

/// One cell of the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    /// Alignment filler before day 1; not a real day
    Padding,
    /// A day of the displayed month
    Day(DailyAllocation),
}

impl CalendarCell {
    pub fn is_padding(&self) -> bool {
        matches!(self, Self::Padding)
    }

    pub fn as_day(&self) -> Option<&DailyAllocation> {
        match self {
            Self::Day(allocation) => Some(allocation),
            Self::Padding => None,
        }
    }
}

/// A month laid out for a seven-column calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Weekday of the first column
    #[serde(serialize_with = "serialize_weekday")]
    pub week_start: Weekday,
    /// Number of padding cells before day 1
    pub leading_padding: u32,
    pub cells: Vec<CalendarCell>,
    /// Plans that contributed at least one day
    pub plan_ids: Vec<PlanId>,
}

impl MonthGrid {
    /// Real days of the month, in order
    pub fn days(&self) -> impl Iterator<Item = &DailyAllocation> {
        self.cells.iter().filter_map(CalendarCell::as_day)
    }

    /// Cells split into rows of seven (the last row may be shorter)
    pub fn weeks(&self) -> Vec<&[CalendarCell]> {
        self.cells.chunks(7).collect()
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&day.to_string())
}

/// Number of days in a month, or `None` for an invalid month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

/// Columns to skip before `first` when weeks begin on `week_start`
pub fn leading_padding(first: NaiveDate, week_start: Weekday) -> u32 {
    let day = first.weekday().num_days_from_monday();
    let start = week_start.num_days_from_monday();
    (day + 7 - start) % 7
}

/// Build the month grid for `year`/`month`
///
/// Status and today flags are re-derived against `now` for every cell,
/// independent of what the per-plan pass computed.
pub fn compute_month_grid(
    year: i32,
    month: u32,
    plans: &[Plan],
    expenses: &[Expense],
    now: NaiveDateTime,
    week_start: Weekday,
) -> SpendResult<MonthGrid> {
    let total_days = days_in_month(year, month)
        .ok_or_else(|| SpendError::Validation(format!("Invalid month: {}-{}", year, month)))?;
    let month_start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SpendError::Validation(format!("Invalid month: {}-{}", year, month)))?;
    let month_end = month_start + chrono::Duration::days(i64::from(total_days) - 1);
    let today = now.date();

    let mut merged: HashMap<NaiveDate, DailyAllocation> = HashMap::new();
    let mut plan_ids = Vec::new();

    for plan in plans.iter().filter(|p| p.overlaps_range(month_start, month_end)) {
        plan_ids.push(plan.id);
        for allocation in compute_daily_allocations(plan, expenses, now) {
            if allocation.date >= month_start && allocation.date <= month_end {
                // Plans never overlap once validated; last one wins otherwise.
                merged.insert(allocation.date, allocation);
            }
        }
    }

    let padding = leading_padding(month_start, week_start);
    let mut cells = Vec::with_capacity((padding + total_days) as usize);
    cells.extend((0..padding).map(|_| CalendarCell::Padding));

    for date in month_start.iter_days().take(total_days as usize) {
        let cell = match merged.remove(&date) {
            Some(mut allocation) => {
                allocation.reclassify(today);
                allocation
            }
            None => DailyAllocation::no_plan(date, today),
        };
        cells.push(CalendarCell::Day(cell));
    }

    Ok(MonthGrid {
        year,
        month,
        week_start,
        leading_padding: padding,
        cells,
        plan_ids,
    })
}
