//! Expense model
//!
//! An expense is a single dated outflow. Expenses are matched to plans by
//! date containment; the optional `plan_id` is informational only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, PlanId, RecurringRuleId};
use super::money::Money;

/// Whether a purchase was a need or a want
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Necessity {
    Need,
    Want,
}

impl fmt::Display for Necessity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Need => write!(f, "Need"),
            Self::Want => write!(f, "Want"),
        }
    }
}

/// Where an expense came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpenseSource {
    /// Entered by the user
    #[default]
    Manual,
    /// Generated from a recurring rule
    Recurring { rule_id: RecurringRuleId },
}

/// A single expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Plan this expense was logged under, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,

    /// When the expense happened (local time)
    pub date: NaiveDateTime,

    /// Amount spent (positive)
    pub amount: Money,

    /// Free-text category
    #[serde(default)]
    pub category: String,

    /// Free-text note
    #[serde(default)]
    pub note: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    /// Reference to an attached receipt image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub necessity: Option<Necessity>,

    /// Excluded expenses are listed but never count against a budget
    #[serde(default)]
    pub exclude_from_budget: bool,

    #[serde(default)]
    pub source: ExpenseSource,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new manual expense
    pub fn new(date: NaiveDateTime, amount: Money, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            plan_id: None,
            date,
            amount,
            category: category.into(),
            note: String::new(),
            merchant: None,
            payment_method: None,
            image_ref: None,
            necessity: None,
            exclude_from_budget: false,
            source: ExpenseSource::Manual,
            created_at: now,
            updated_at: now,
        }
    }

    /// Calendar day of the expense
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Whether this expense falls on `day`
    pub fn falls_on(&self, day: NaiveDate) -> bool {
        self.day() == day
    }

    /// Whether this expense falls within the inclusive day range
    pub fn falls_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let day = self.day();
        day >= start && day <= end
    }

    /// Whether this expense consumes budget
    pub fn counts_against_budget(&self) -> bool {
        !self.exclude_from_budget
    }

    /// Whether this expense was generated by a recurring rule
    pub fn is_recurring(&self) -> bool {
        matches!(self.source, ExpenseSource::Recurring { .. })
    }

    /// Mark the expense as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Sum of budget-consuming expenses in the inclusive day range
pub fn budget_spent_between(expenses: &[Expense], start: NaiveDate, end: NaiveDate) -> Money {
    expenses
        .iter()
        .filter(|e| e.counts_against_budget() && e.falls_within(start, end))
        .map(|e| e.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_day_window_covers_whole_day() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let early = Expense::new(at(2025, 1, 15, 0, 0), Money::from_units(5), "Coffee");
        let late = Expense::new(
            day.and_hms_milli_opt(23, 59, 59, 999).unwrap(),
            Money::from_units(5),
            "Snack",
        );
        let next = Expense::new(at(2025, 1, 16, 0, 0), Money::from_units(5), "Lunch");

        assert!(early.falls_on(day));
        assert!(late.falls_on(day));
        assert!(!next.falls_on(day));
    }

    #[test]
    fn test_budget_spent_skips_excluded() {
        let mut excluded = Expense::new(at(2025, 1, 2, 9, 0), Money::from_units(400), "Rent");
        excluded.exclude_from_budget = true;
        let expenses = vec![
            Expense::new(at(2025, 1, 1, 12, 0), Money::from_units(30), "Food"),
            excluded,
            Expense::new(at(2025, 1, 3, 18, 0), Money::from_units(20), "Food"),
            Expense::new(at(2025, 2, 1, 18, 0), Money::from_units(99), "Food"),
        ];

        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(budget_spent_between(&expenses, start, end).units(), 50);
    }

    #[test]
    fn test_source_serialization() {
        let mut expense = Expense::new(at(2025, 1, 1, 8, 0), Money::from_units(12), "Streaming");
        let rule_id = RecurringRuleId::new();
        expense.source = ExpenseSource::Recurring { rule_id };

        let json = serde_json::to_string(&expense).unwrap();
        let back: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, ExpenseSource::Recurring { rule_id });
        assert!(back.is_recurring());
    }
}
