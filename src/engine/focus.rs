//! Focus view: where the user stands today within a plan

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::allocation::{compute_daily_allocations, spent_in_plan, today_available, DailyAllocation, DayStatus};
use crate::models::{Expense, Money, Plan, PlanId};

/// Position of today relative to a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    Upcoming,
    InProgress,
    Ended,
}

/// Summary of a plan as seen from today
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusSummary {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub today: NaiveDate,
    pub phase: PlanPhase,
    pub daily_limit: Money,
    pub spendable: Money,
    pub spent: Money,
    /// Spendable budget not yet spent
    pub remaining: Money,
    /// See [`today_available`]
    pub today_available: Option<Money>,
    pub today_allocation: Option<DailyAllocation>,
    pub days_total: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub success_days: usize,
    pub fail_days: usize,
}

/// Pick the plan to focus on for `today`
///
/// The plan covering today wins; otherwise the next upcoming plan; otherwise
/// the most recently ended one.
pub fn select_focus_plan(plans: &[Plan], today: NaiveDate) -> Option<&Plan> {
    if let Some(current) = plans.iter().find(|p| p.contains(today)) {
        return Some(current);
    }

    let upcoming = plans
        .iter()
        .filter(|p| p.is_upcoming(today))
        .min_by_key(|p| p.start);

    upcoming.or_else(|| plans.iter().filter(|p| p.has_ended(today)).max_by_key(|p| p.end))
}

/// Build the focus summary for `plan` at `now`
pub fn compute_focus(plan: &Plan, expenses: &[Expense], now: NaiveDateTime) -> FocusSummary {
    let today = now.date();
    let allocations = compute_daily_allocations(plan, expenses, now);
    let spent = spent_in_plan(plan, expenses);

    let phase = if plan.is_upcoming(today) {
        PlanPhase::Upcoming
    } else if plan.has_ended(today) {
        PlanPhase::Ended
    } else {
        PlanPhase::InProgress
    };

    let days_total = plan.day_count();
    let days_elapsed = allocations.iter().filter(|a| !a.is_future()).count() as i64;

    FocusSummary {
        plan_id: plan.id,
        plan_name: plan.name.clone(),
        today,
        phase,
        daily_limit: plan.daily_limit(),
        spendable: plan.spendable(),
        spent,
        remaining: plan.spendable() - spent,
        today_available: today_available(plan, &allocations, expenses, today),
        today_allocation: allocations.iter().find(|a| a.is_today).cloned(),
        days_total,
        days_elapsed,
        days_remaining: days_total - days_elapsed,
        success_days: count_status(&allocations, DayStatus::SpendSuccess),
        fail_days: count_status(&allocations, DayStatus::SpendFail),
    }
}

fn count_status(allocations: &[DailyAllocation], status: DayStatus) -> usize {
    allocations.iter().filter(|a| a.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(d: NaiveDate) -> NaiveDateTime {
        d.and_hms_opt(12, 0, 0).unwrap()
    }

    fn plan(name: &str, start: NaiveDate, end: NaiveDate) -> Plan {
        Plan::new(name, start, end, Money::from_units(1000), Money::from_units(100))
    }

    #[test]
    fn test_select_focus_plan_prefers_current() {
        let plans = vec![
            plan("Past", date(2025, 1, 1), date(2025, 1, 31)),
            plan("Now", date(2025, 2, 1), date(2025, 2, 28)),
            plan("Next", date(2025, 3, 1), date(2025, 3, 31)),
        ];

        assert_eq!(select_focus_plan(&plans, date(2025, 2, 14)).unwrap().name, "Now");
        assert_eq!(select_focus_plan(&plans[..1], date(2025, 2, 14)).unwrap().name, "Past");
        assert_eq!(select_focus_plan(&plans[2..], date(2025, 2, 14)).unwrap().name, "Next");
        assert!(select_focus_plan(&[], date(2025, 2, 14)).is_none());
    }

    #[test]
    fn test_focus_in_progress() {
        let p = plan("Ten days", date(2025, 4, 1), date(2025, 4, 10));
        let expenses = vec![
            Expense::new(noon(date(2025, 4, 1)), Money::from_units(120), "Food"),
            Expense::new(noon(date(2025, 4, 3)), Money::from_units(30), "Food"),
        ];

        let focus = compute_focus(&p, &expenses, noon(date(2025, 4, 3)));

        assert_eq!(focus.phase, PlanPhase::InProgress);
        assert_eq!(focus.daily_limit.units(), 90);
        assert_eq!(focus.spent.units(), 150);
        assert_eq!(focus.remaining.units(), 750);
        // 90*3 - 150
        assert_eq!(focus.today_available, Some(Money::from_units(120)));
        assert_eq!(focus.today_allocation.as_ref().map(|a| a.date), Some(date(2025, 4, 3)));
        assert_eq!(focus.days_elapsed, 3);
        assert_eq!(focus.days_remaining, 7);
        assert_eq!(focus.fail_days, 1);
        assert_eq!(focus.success_days, 2);
    }

    #[test]
    fn test_focus_after_end_settles() {
        let p = plan("Done", date(2025, 4, 1), date(2025, 4, 10));
        let expenses = vec![Expense::new(noon(date(2025, 4, 5)), Money::from_units(905), "Trip")];

        let focus = compute_focus(&p, &expenses, noon(date(2025, 5, 1)));

        assert_eq!(focus.phase, PlanPhase::Ended);
        assert_eq!(focus.today_available, Some(Money::from_units(-5)));
        assert!(focus.today_allocation.is_none());
        assert_eq!(focus.days_remaining, 0);
    }

    #[test]
    fn test_focus_upcoming() {
        let p = plan("Later", date(2025, 6, 1), date(2025, 6, 30));
        let focus = compute_focus(&p, &[], noon(date(2025, 5, 1)));

        assert_eq!(focus.phase, PlanPhase::Upcoming);
        assert_eq!(focus.today_available, None);
        assert_eq!(focus.days_elapsed, 0);
        assert_eq!(focus.days_remaining, 30);
    }
}
