//! Plan model
//!
//! A plan is a time-boxed budget: a total amount to spend over an inclusive
//! date range, minus a savings target that is set aside up front.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PlanId;
use super::money::Money;

/// A budgeting period with a total budget, savings goal and date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique identifier
    pub id: PlanId,

    /// Display name
    pub name: String,

    /// First day of the plan (inclusive)
    pub start: NaiveDate,

    /// Last day of the plan (inclusive)
    pub end: NaiveDate,

    /// Total budget for the whole range
    pub total_budget: Money,

    /// Amount the user wants left over at the end
    #[serde(default)]
    pub target_savings: Money,

    /// Whether the plan is active
    #[serde(default = "default_active")]
    pub active: bool,

    /// When the plan was created
    pub created_at: DateTime<Utc>,

    /// When the plan was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Plan {
    /// Create a new plan
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        total_budget: Money,
        target_savings: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PlanId::new(),
            name: name.into(),
            start,
            end,
            total_budget,
            target_savings,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of calendar days covered, never less than one
    pub fn day_count(&self) -> i64 {
        let days = (self.end - self.start).num_days() + 1;
        days.max(1)
    }

    /// Budget available for spending (total minus savings target)
    pub fn spendable(&self) -> Money {
        self.total_budget - self.target_savings
    }

    /// Even per-day share of the spendable amount, floor-divided
    pub fn daily_limit(&self) -> Money {
        self.spendable().split_floor(self.day_count())
    }

    /// Check if a date falls within this plan
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Closed-interval overlap test against an arbitrary date range
    pub fn overlaps_range(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && self.end >= start
    }

    /// Closed-interval overlap test against another plan
    pub fn overlaps(&self, other: &Plan) -> bool {
        self.overlaps_range(other.start, other.end)
    }

    /// Whether the whole plan lies before `today`
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end < today
    }

    /// Whether the plan has not started yet
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.start > today
    }

    /// Mark the plan as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} .. {})",
            self.name,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_count_inclusive() {
        let plan = Plan::new("Jan", date(2025, 1, 1), date(2025, 1, 31), Money::from_units(3100), Money::zero());
        assert_eq!(plan.day_count(), 31);

        let single = Plan::new("One", date(2025, 1, 5), date(2025, 1, 5), Money::from_units(10), Money::zero());
        assert_eq!(single.day_count(), 1);
    }

    #[test]
    fn test_day_count_degenerate_range() {
        let backwards = Plan::new("Bad", date(2025, 1, 10), date(2025, 1, 1), Money::from_units(10), Money::zero());
        assert_eq!(backwards.day_count(), 1);
    }

    #[test]
    fn test_daily_limit_subtracts_savings() {
        let plan = Plan::new("Feb", date(2025, 2, 1), date(2025, 2, 10), Money::from_units(1000), Money::from_units(200));
        assert_eq!(plan.spendable().units(), 800);
        assert_eq!(plan.daily_limit().units(), 80);
    }

    #[test]
    fn test_overlap_is_closed_interval() {
        let jan = Plan::new("Jan", date(2025, 1, 1), date(2025, 1, 31), Money::from_units(1), Money::zero());
        let touching = Plan::new("T", date(2025, 1, 31), date(2025, 2, 15), Money::from_units(1), Money::zero());
        let after = Plan::new("Feb", date(2025, 2, 1), date(2025, 2, 15), Money::from_units(1), Money::zero());

        assert!(jan.overlaps(&touching));
        assert!(!jan.overlaps(&after));
    }

    #[test]
    fn test_serialization_defaults() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Spring",
            "start": "2025-03-01",
            "end": "2025-03-31",
            "total_budget": 900,
            "created_at": "2025-03-01T00:00:00Z",
            "updated_at": "2025-03-01T00:00:00Z"
        }"#;
        let plan: Plan = serde_json::from_str(json).unwrap();
        assert!(plan.active);
        assert!(plan.target_savings.is_zero());
    }
}
