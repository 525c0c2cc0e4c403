//! Plan validation
//!
//! Plans may not share a single calendar day. Ranges are closed on both ends,
//! so a plan ending on the 31st conflicts with one starting on the 31st.

use chrono::{Duration, Months, NaiveDate};

use crate::error::{SpendError, SpendResult};
use crate::models::{Money, Plan};

/// Whether `candidate` overlaps any plan in `existing`
///
/// A plan with the candidate's own id is skipped, so an edit never conflicts
/// with the version it replaces.
pub fn check_overlap(candidate: &Plan, existing: &[Plan]) -> bool {
    find_conflict(candidate, existing).is_some()
}

/// First plan in `existing` that overlaps `candidate`
pub fn find_conflict<'a>(candidate: &Plan, existing: &'a [Plan]) -> Option<&'a Plan> {
    existing
        .iter()
        .filter(|p| p.id != candidate.id)
        .find(|p| candidate.overlaps(p))
}

/// Validate a plan before it is created or updated
pub fn validate_plan(candidate: &Plan, existing: &[Plan]) -> SpendResult<()> {
    if candidate.name.trim().is_empty() {
        return Err(SpendError::Validation("Plan name cannot be empty".into()));
    }

    if !candidate.total_budget.is_positive() {
        return Err(SpendError::Validation(format!(
            "Total budget must be positive, got {}",
            candidate.total_budget
        )));
    }

    if candidate.total_budget.exceeds_max() {
        return Err(SpendError::Validation(format!(
            "Total budget cannot exceed {}",
            Money::MAX_AMOUNT
        )));
    }

    if candidate.target_savings.is_negative() {
        return Err(SpendError::Validation(format!(
            "Target savings cannot be negative, got {}",
            candidate.target_savings
        )));
    }

    if candidate.target_savings.exceeds_max() {
        return Err(SpendError::Validation(format!(
            "Target savings cannot exceed {}",
            Money::MAX_AMOUNT
        )));
    }

    if candidate.end < candidate.start {
        return Err(SpendError::Validation(format!(
            "Plan ends ({}) before it starts ({})",
            candidate.end, candidate.start
        )));
    }

    if let Some(conflict) = find_conflict(candidate, existing) {
        return Err(SpendError::Validation(format!(
            "Plan overlaps with '{}' ({} .. {})",
            conflict.name, conflict.start, conflict.end
        )));
    }

    Ok(())
}

/// Suggest a date range for the next plan
///
/// Starts the day after the latest existing plan ends (or today, if that is
/// later) and runs for one calendar month, so the suggestion never touches an
/// existing plan.
pub fn suggest_next_range(existing: &[Plan], today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let after_latest = existing
        .iter()
        .map(|p| p.end.max(p.start))
        .max()
        .and_then(|end| end.succ_opt());

    let start = match after_latest {
        Some(day) if day > today => day,
        _ => today,
    };

    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(start + Duration::days(29));

    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(start: NaiveDate, end: NaiveDate) -> Plan {
        Plan::new("Plan", start, end, Money::from_units(1000), Money::zero())
    }

    #[test]
    fn test_shared_boundary_day_conflicts() {
        let existing = vec![plan(date(2025, 1, 1), date(2025, 1, 31))];

        assert!(check_overlap(&plan(date(2025, 1, 31), date(2025, 2, 15)), &existing));
        assert!(!check_overlap(&plan(date(2025, 2, 1), date(2025, 2, 15)), &existing));
    }

    #[test]
    fn test_containing_and_contained_ranges_conflict() {
        let existing = vec![plan(date(2025, 3, 10), date(2025, 3, 20))];

        assert!(check_overlap(&plan(date(2025, 3, 1), date(2025, 3, 31)), &existing));
        assert!(check_overlap(&plan(date(2025, 3, 12), date(2025, 3, 13)), &existing));
        assert!(!check_overlap(&plan(date(2025, 3, 1), date(2025, 3, 9)), &existing));
    }

    #[test]
    fn test_edit_ignores_own_version() {
        let original = plan(date(2025, 1, 1), date(2025, 1, 31));
        let mut edited = original.clone();
        edited.end = date(2025, 2, 5);

        assert!(!check_overlap(&edited, &[original]));
    }

    #[test]
    fn test_validate_plan_rejects_bad_fields() {
        let mut p = plan(date(2025, 1, 1), date(2025, 1, 31));
        p.name = "   ".into();
        assert!(validate_plan(&p, &[]).unwrap_err().is_validation());

        let mut p = plan(date(2025, 1, 1), date(2025, 1, 31));
        p.total_budget = Money::zero();
        assert!(validate_plan(&p, &[]).is_err());

        let mut p = plan(date(2025, 1, 1), date(2025, 1, 31));
        p.target_savings = Money::from_units(-1);
        assert!(validate_plan(&p, &[]).is_err());

        let p = plan(date(2025, 1, 31), date(2025, 1, 1));
        assert!(validate_plan(&p, &[]).is_err());
    }

    #[test]
    fn test_validate_plan_budget_bound() {
        let mut p = plan(date(2025, 1, 1), date(2025, 1, 31));
        p.total_budget = Money::MAX_AMOUNT;
        assert!(validate_plan(&p, &[]).is_ok());

        p.total_budget = Money::from_units(i64::MAX);
        assert!(validate_plan(&p, &[]).unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_plan_reports_conflict() {
        let existing = vec![plan(date(2025, 1, 1), date(2025, 1, 31))];
        let err = validate_plan(&plan(date(2025, 1, 31), date(2025, 2, 15)), &existing).unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("overlaps"));
        assert!(validate_plan(&plan(date(2025, 2, 1), date(2025, 2, 15)), &existing).is_ok());
    }

    #[test]
    fn test_suggest_next_range_follows_latest_plan() {
        let existing = vec![
            plan(date(2025, 1, 1), date(2025, 1, 31)),
            plan(date(2025, 2, 1), date(2025, 2, 28)),
        ];
        let (start, end) = suggest_next_range(&existing, date(2025, 2, 10));

        assert_eq!(start, date(2025, 3, 1));
        assert_eq!(end, date(2025, 3, 31));

        let candidate = plan(start, end);
        assert!(!check_overlap(&candidate, &existing));
    }

    #[test]
    fn test_suggest_next_range_starts_today_when_free() {
        let existing = vec![plan(date(2024, 11, 1), date(2024, 11, 30))];
        let (start, end) = suggest_next_range(&existing, date(2025, 1, 15));

        assert_eq!(start, date(2025, 1, 15));
        assert_eq!(end, date(2025, 2, 14));
        assert_eq!(suggest_next_range(&[], date(2025, 1, 15)).0, date(2025, 1, 15));
    }
}
