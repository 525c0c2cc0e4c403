//! Recurring expense materialization
//!
//! Turns every due-but-not-yet-generated occurrence of a rule into an
//! expense and advances the rule's watermark past them. Re-running with the
//! same `now` generates nothing, since the watermark already covers it.

use chrono::NaiveDateTime;

use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, RecurringRule};

/// Upper bound on occurrences generated in one call
///
/// A rule that is further behind than this catches up over several runs.
pub const MAX_OCCURRENCES_PER_RUN: usize = 4096;

/// Result of materializing one rule
#[derive(Debug, Clone)]
pub struct Materialization {
    /// Watermark the computation started from
    pub previous_watermark: NaiveDateTime,
    /// The rule with its watermark moved to the last emitted occurrence
    pub rule: RecurringRule,
    /// Newly due expenses, oldest first
    pub expenses: Vec<Expense>,
}

impl Materialization {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Whether the rule needs to be written back
    pub fn advanced(&self) -> bool {
        self.rule.last_generated != self.previous_watermark
    }
}

/// Generate all occurrences of `rule` due at or before `now`
///
/// Occurrences after the rule's end are never generated. A malformed rule
/// yields a validation error and no expenses.
pub fn materialize(rule: &RecurringRule, now: NaiveDateTime) -> SpendResult<Materialization> {
    rule.validate()
        .map_err(|e| SpendError::Validation(format!("Recurring rule {}: {}", rule.id, e)))?;

    let mut updated = rule.clone();
    let mut expenses = Vec::new();

    while expenses.len() < MAX_OCCURRENCES_PER_RUN {
        let Some(next) = updated.next_due() else {
            break;
        };
        if next > now || !rule.allows(next) {
            break;
        }

        expenses.push(rule.expense_for(next));
        updated.last_generated = next;
    }

    if !expenses.is_empty() {
        updated.touch();
    }

    Ok(Materialization {
        previous_watermark: rule.last_generated,
        rule: updated,
        expenses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseSource, Frequency, Money};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn rule(start: NaiveDateTime, frequency: Frequency) -> RecurringRule {
        RecurringRule::new(Money::from_units(20), "Subscriptions", start, frequency)
    }

    #[test]
    fn test_first_occurrence_is_start_date() {
        let r = rule(at(2025, 1, 10), Frequency::Weekly);
        let result = materialize(&r, at(2025, 1, 10)).unwrap();

        assert_eq!(result.expenses.len(), 1);
        assert_eq!(result.expenses[0].date, at(2025, 1, 10));
        assert_eq!(result.rule.last_generated, at(2025, 1, 10));
    }

    #[test]
    fn test_nothing_due_before_start() {
        let r = rule(at(2025, 1, 10), Frequency::Daily);
        let result = materialize(&r, at(2025, 1, 9)).unwrap();

        assert!(result.is_empty());
        assert!(!result.advanced());
        assert_eq!(result.rule, r);
    }

    #[test]
    fn test_catches_up_all_due_occurrences() {
        let r = rule(at(2025, 1, 1), Frequency::Daily);
        let result = materialize(&r, at(2025, 1, 5)).unwrap();

        let dates: Vec<NaiveDateTime> = result.expenses.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![at(2025, 1, 1), at(2025, 1, 2), at(2025, 1, 3), at(2025, 1, 4), at(2025, 1, 5)]);
        assert!(result
            .expenses
            .iter()
            .all(|e| e.source == ExpenseSource::Recurring { rule_id: r.id } && e.amount.units() == 20));
    }

    #[test]
    fn test_rerun_at_same_now_is_idempotent() {
        let r = rule(at(2025, 1, 1), Frequency::every_n_days(3));
        let now = at(2025, 1, 20);

        let first = materialize(&r, now).unwrap();
        assert_eq!(first.expenses.len(), 7);

        let second = materialize(&first.rule, now).unwrap();
        assert!(second.is_empty());
        assert_eq!(second.rule.last_generated, first.rule.last_generated);
    }

    #[test]
    fn test_monthly_anniversary_generates_exactly_one() {
        let r = rule(at(2025, 1, 15), Frequency::Monthly);
        let after_start = materialize(&r, at(2025, 1, 15)).unwrap();
        assert_eq!(after_start.expenses.len(), 1);

        let anniversary = at(2025, 2, 15);
        let result = materialize(&after_start.rule, anniversary).unwrap();

        assert_eq!(result.expenses.len(), 1);
        assert_eq!(result.expenses[0].date, anniversary);
        assert_eq!(result.rule.last_generated, anniversary);
    }

    #[test]
    fn test_monthly_steps_from_clamped_watermark() {
        let r = rule(at(2025, 1, 31), Frequency::Monthly);
        let result = materialize(&r, at(2025, 4, 1)).unwrap();

        let dates: Vec<NaiveDateTime> = result.expenses.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![at(2025, 1, 31), at(2025, 2, 28), at(2025, 3, 28)]);
        assert_eq!(result.rule.last_generated, at(2025, 3, 28));
    }

    #[test]
    fn test_end_date_is_inclusive_and_stops_generation() {
        let mut r = rule(at(2025, 1, 1), Frequency::Weekly);
        r.end = Some(at(2025, 1, 15));

        let result = materialize(&r, at(2025, 3, 1)).unwrap();
        let dates: Vec<NaiveDateTime> = result.expenses.iter().map(|e| e.date).collect();

        assert_eq!(dates, vec![at(2025, 1, 1), at(2025, 1, 8), at(2025, 1, 15)]);
        assert!(result.rule.is_dormant());

        let later = materialize(&result.rule, at(2026, 1, 1)).unwrap();
        assert!(later.is_empty());
    }

    #[test]
    fn test_malformed_rule_is_rejected() {
        let r = rule(at(2025, 1, 1), Frequency::every_n_days(0));
        let err = materialize(&r, at(2025, 2, 1)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_run_is_bounded() {
        let r = rule(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(), Frequency::Daily);
        let now = at(2025, 1, 1);

        let first = materialize(&r, now).unwrap();
        assert_eq!(first.expenses.len(), MAX_OCCURRENCES_PER_RUN);

        let second = materialize(&first.rule, now).unwrap();
        assert!(!second.is_empty());
        assert!(second.expenses[0].date > first.rule.last_generated);
    }
}
