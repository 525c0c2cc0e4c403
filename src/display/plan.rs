//! Plan display formatting
//!
//! Plan tables, the per-day allocation breakdown and the focus summary.

use chrono::NaiveDate;

use crate::engine::{DailyAllocation, DayStatus, FocusSummary, PlanPhase};
use crate::models::Plan;

/// Format a list of plans as a table
pub fn format_plan_list(plans: &[Plan], today: NaiveDate, symbol: &str) -> String {
    if plans.is_empty() {
        return "No plans found. Create one with 'spendwise plan add'.".to_string();
    }

    let name_width = plans.iter().map(|p| p.name.len()).max().unwrap_or(4).max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<name_width$}  {:<10}  {:<10}  {:>10}  {:>10}  {:>8}  {}\n",
        "ID",
        "Name",
        "Start",
        "End",
        "Budget",
        "Savings",
        "Daily",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<name_width$}  {:-<10}  {:-<10}  {:->10}  {:->10}  {:->8}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for plan in plans {
        let status = if plan.contains(today) {
            "Current"
        } else if plan.is_upcoming(today) {
            "Upcoming"
        } else {
            "Ended"
        };

        output.push_str(&format!(
            "{:<12}  {:<name_width$}  {:<10}  {:<10}  {:>10}  {:>10}  {:>8}  {}\n",
            plan.id.to_string(),
            plan.name,
            plan.start.to_string(),
            plan.end.to_string(),
            plan.total_budget.format_with_symbol(symbol),
            plan.target_savings.format_with_symbol(symbol),
            plan.daily_limit().format_with_symbol(symbol),
            status,
            name_width = name_width,
        ));
    }

    output
}

/// Format a plan header followed by its day-by-day allocations
pub fn format_plan_details(plan: &Plan, allocations: &[DailyAllocation], symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Plan: {}\n", plan.name));
    output.push_str(&format!("  ID:             {}\n", plan.id));
    output.push_str(&format!("  Dates:          {} .. {} ({} days)\n", plan.start, plan.end, plan.day_count()));
    output.push_str(&format!("  Total budget:   {}\n", plan.total_budget.format_with_symbol(symbol)));
    output.push_str(&format!("  Target savings: {}\n", plan.target_savings.format_with_symbol(symbol)));
    output.push_str(&format!("  Daily limit:    {}\n", plan.daily_limit().format_with_symbol(symbol)));
    if !plan.active {
        output.push_str("  Inactive\n");
    }
    output.push('\n');

    output.push_str(&format!(
        "{:<10}  {:>9}  {:>9}  {:>9}  {:>9}  {}\n",
        "Date", "Limit", "Carry", "Spent", "Balance", "Status"
    ));
    output.push_str(&format!(
        "{:-<10}  {:->9}  {:->9}  {:->9}  {:->9}  {:-<8}\n",
        "", "", "", "", "", ""
    ));

    for allocation in allocations {
        let marker = if allocation.is_today { " <- today" } else { "" };
        output.push_str(&format!(
            "{:<10}  {:>9}  {:>9}  {:>9}  {:>9}  {}{}\n",
            allocation.date.to_string(),
            allocation.base_limit.format_with_symbol(symbol),
            allocation.carry_in.format_with_symbol(symbol),
            allocation.spent.format_with_symbol(symbol),
            allocation.balance.format_with_symbol(symbol),
            status_label(allocation.status),
            marker,
        ));
    }

    output
}

/// Human label for a day status
pub fn status_label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Future => "Future",
        DayStatus::SpendSuccess => "On track",
        DayStatus::SpendFail => "Over",
        DayStatus::NoPlan => "No plan",
    }
}

/// Format the focus summary shown by `spendwise today`
pub fn format_focus(focus: &FocusSummary, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} - {}\n", focus.plan_name, focus.today));

    match focus.phase {
        PlanPhase::Upcoming => {
            output.push_str(&format!(
                "  Starts in the future; {} days at {} a day.\n",
                focus.days_total,
                focus.daily_limit.format_with_symbol(symbol)
            ));
        }
        PlanPhase::InProgress => {
            if let Some(available) = focus.today_available {
                output.push_str(&format!("  Available today: {}\n", available.format_with_symbol(symbol)));
            }
            if let Some(today) = &focus.today_allocation {
                output.push_str(&format!(
                    "  Spent today:     {} of {}\n",
                    today.spent.format_with_symbol(symbol),
                    today.available().format_with_symbol(symbol)
                ));
            }
            output.push_str(&format!(
                "  Day {} of {} ({} left)\n",
                focus.days_elapsed, focus.days_total, focus.days_remaining
            ));
        }
        PlanPhase::Ended => {
            if let Some(settlement) = focus.today_available {
                let label = if settlement.is_negative() { "Overspent" } else { "Left over" };
                output.push_str(&format!("  Plan ended. {}: {}\n", label, settlement.abs().format_with_symbol(symbol)));
            }
        }
    }

    output.push_str(&format!(
        "  Spent {} of {} ({} remaining)\n",
        focus.spent.format_with_symbol(symbol),
        focus.spendable.format_with_symbol(symbol),
        focus.remaining.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Days on track: {}  Days over: {}\n",
        focus.success_days, focus.fail_days
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute_daily_allocations, compute_focus};
    use crate::models::{Expense, Money};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_plan_list() {
        assert!(format_plan_list(&[], date(2025, 1, 1), "$").contains("No plans"));
    }

    #[test]
    fn test_plan_list_shows_status() {
        let plans = vec![
            Plan::new("Winter", date(2025, 1, 1), date(2025, 1, 31), Money::from_units(3100), Money::zero()),
            Plan::new("Spring", date(2025, 3, 1), date(2025, 3, 31), Money::from_units(3100), Money::zero()),
        ];
        let output = format_plan_list(&plans, date(2025, 1, 15), "€");

        assert!(output.contains("Winter"));
        assert!(output.contains("Current"));
        assert!(output.contains("Upcoming"));
        assert!(output.contains("€100"));
    }

    #[test]
    fn test_plan_details_mark_today() {
        let plan = Plan::new("Short", date(2025, 1, 1), date(2025, 1, 2), Money::from_units(20), Money::zero());
        let now = date(2025, 1, 1).and_hms_opt(9, 0, 0).unwrap();
        let allocations = compute_daily_allocations(&plan, &[], now);
        let output = format_plan_details(&plan, &allocations, "$");

        assert!(output.contains("Daily limit:    $10"));
        assert!(output.contains("<- today"));
        assert!(output.contains("Future"));
    }

    #[test]
    fn test_focus_for_ended_plan_shows_settlement() {
        let plan = Plan::new("Done", date(2025, 1, 1), date(2025, 1, 2), Money::from_units(20), Money::zero());
        let expenses = vec![Expense::new(date(2025, 1, 1).and_hms_opt(9, 0, 0).unwrap(), Money::from_units(25), "Food")];
        let focus = compute_focus(&plan, &expenses, date(2025, 2, 1).and_hms_opt(9, 0, 0).unwrap());

        assert!(format_focus(&focus, "$").contains("Overspent: $5"));
    }
}
