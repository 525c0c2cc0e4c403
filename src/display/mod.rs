//! Display formatting for terminal output
//!
//! Every formatter returns a `String`; printing is left to the CLI handlers.

pub mod calendar;
pub mod expense;
pub mod plan;
pub mod recurring;

pub use calendar::format_month_grid;
pub use expense::{format_expense_created, format_expense_list};
pub use plan::{format_focus, format_plan_details, format_plan_list, status_label};
pub use recurring::{format_materialize_report, format_rule_list};
