//! Budget engine
//!
//! Pure computations over plans, expenses and recurring rules. Nothing in here
//! touches storage or the clock; callers pass the current time in.

pub mod allocation;
pub mod calendar;
pub mod focus;
pub mod recurrence;
pub mod validation;

pub use allocation::{compute_daily_allocations, spent_in_plan, today_available, DailyAllocation, DayStatus};
pub use calendar::{compute_month_grid, days_in_month, CalendarCell, MonthGrid};
pub use focus::{compute_focus, select_focus_plan, FocusSummary, PlanPhase};
pub use recurrence::{materialize, Materialization, MAX_OCCURRENCES_PER_RUN};
pub use validation::{check_overlap, find_conflict, suggest_next_range, validate_plan};
