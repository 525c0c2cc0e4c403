//! Daily allocation engine
//!
//! Spreads a plan's spendable amount evenly over its days and rolls each day's
//! leftover (or overspend) into the next day. Everything here is a pure
//! function of its inputs; "now" is passed in by the caller.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{budget_spent_between, Expense, Money, Plan, PlanId};

/// Outcome of a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// The day has not started yet
    Future,
    /// Ended the day at or under the running allowance
    SpendSuccess,
    /// Ended the day over the running allowance
    SpendFail,
    /// No plan covers this day
    NoPlan,
}

impl DayStatus {
    /// Classify a day inside a plan
    ///
    /// Days after `today` are always `Future`, whatever their balance.
    pub fn classify(date: NaiveDate, today: NaiveDate, balance: Money) -> Self {
        if date > today {
            Self::Future
        } else if balance.is_negative() {
            Self::SpendFail
        } else {
            Self::SpendSuccess
        }
    }
}

/// Spending allowance and outcome for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAllocation {
    pub date: NaiveDate,
    /// Plan covering the day, `None` for placeholder days
    pub plan_id: Option<PlanId>,
    /// Even share of the plan's spendable budget
    pub base_limit: Money,
    /// Budget-consuming spend on this day
    pub spent: Money,
    /// Previous day's balance (zero on the first day)
    pub carry_in: Money,
    /// base_limit + carry_in - spent
    pub balance: Money,
    pub status: DayStatus,
    pub is_today: bool,
}

impl DailyAllocation {
    /// Placeholder for a day no plan covers
    pub fn no_plan(date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            date,
            plan_id: None,
            base_limit: Money::zero(),
            spent: Money::zero(),
            carry_in: Money::zero(),
            balance: Money::zero(),
            status: DayStatus::NoPlan,
            is_today: date == today,
        }
    }

    /// Total allowance for the day before spending
    pub fn available(&self) -> Money {
        self.base_limit + self.carry_in
    }

    pub fn is_future(&self) -> bool {
        self.status == DayStatus::Future
    }

    pub fn has_plan(&self) -> bool {
        self.plan_id.is_some()
    }

    /// Re-derive the status and today flag against a new reference day
    pub fn reclassify(&mut self, today: NaiveDate) {
        self.is_today = self.date == today;
        if self.has_plan() {
            self.status = DayStatus::classify(self.date, today, self.balance);
        }
    }
}

/// Compute one allocation per day of `plan`, in date order
///
/// `expenses` may contain entries outside the plan; they are ignored, as are
/// expenses flagged `exclude_from_budget`.
pub fn compute_daily_allocations(
    plan: &Plan,
    expenses: &[Expense],
    now: NaiveDateTime,
) -> Vec<DailyAllocation> {
    let today = now.date();
    let day_count = plan.day_count();
    let base_limit = plan.daily_limit();

    let mut spent_by_day: HashMap<NaiveDate, Money> = HashMap::new();
    for expense in expenses
        .iter()
        .filter(|e| e.counts_against_budget() && e.falls_within(plan.start, plan.end))
    {
        *spent_by_day.entry(expense.day()).or_default() += expense.amount;
    }

    let mut allocations = Vec::with_capacity(day_count as usize);
    let mut carry_in = Money::zero();

    for date in plan.start.iter_days().take(day_count as usize) {
        let spent = spent_by_day.get(&date).copied().unwrap_or_default();
        let balance = base_limit + carry_in - spent;

        allocations.push(DailyAllocation {
            date,
            plan_id: Some(plan.id),
            base_limit,
            spent,
            carry_in,
            balance,
            status: DayStatus::classify(date, today, balance),
            is_today: date == today,
        });

        carry_in = balance;
    }

    allocations
}

/// Budget-consuming spend inside the plan's date range
pub fn spent_in_plan(plan: &Plan, expenses: &[Expense]) -> Money {
    budget_spent_between(expenses, plan.start, plan.end)
}

/// What the user may still spend today
///
/// Inside the plan this is today's running balance. Once the plan has ended it
/// becomes the final settlement: spendable budget minus everything spent.
/// Returns `None` before the plan starts.
pub fn today_available(
    plan: &Plan,
    allocations: &[DailyAllocation],
    expenses: &[Expense],
    today: NaiveDate,
) -> Option<Money> {
    if plan.has_ended(today) {
        return Some(plan.spendable() - spent_in_plan(plan, expenses));
    }

    allocations
        .iter()
        .find(|a| a.date == today)
        .map(|a| a.balance)
}
