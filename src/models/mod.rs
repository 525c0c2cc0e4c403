//! Core data models for Spendwise
//!
//! Plans, expenses, recurring rules and the small value types they share.

pub mod expense;
pub mod ids;
pub mod money;
pub mod plan;
pub mod recurring;

pub use expense::{budget_spent_between, Expense, ExpenseSource, Necessity};
pub use ids::{ExpenseId, PlanId, RecurringRuleId};
pub use money::Money;
pub use plan::Plan;
pub use recurring::{Frequency, RecurringRule, RuleValidationError};
