//! Service layer for Spendwise
//!
//! Services read a snapshot from storage, run the engine over it and write
//! the results back. They hold a borrowed [`Storage`](crate::storage::Storage)
//! and are cheap to construct per command.

pub mod expense;
pub mod plan;
pub mod recurring;

pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput};
pub use plan::{CreatePlanInput, PlanService, UpdatePlanInput};
pub use recurring::{CreateRuleInput, MaterializeReport, RecurringService, RuleFailure};
