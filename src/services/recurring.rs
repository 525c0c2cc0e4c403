//! Recurring rule service
//!
//! Rule management and the batch that turns due occurrences into expenses.
//! Each rule is materialized from a snapshot and committed with a
//! compare-and-set on its watermark, so overlapping runs never generate the
//! same occurrence twice.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::engine::materialize;
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, Frequency, Money, PlanId, RecurringRule, RecurringRuleId};
use crate::storage::Storage;

/// Service for recurring rules
pub struct RecurringService<'a> {
    storage: &'a Storage,
}

/// Input for creating a recurring rule
#[derive(Debug, Clone)]
pub struct CreateRuleInput {
    pub amount: Money,
    pub category: String,
    pub note: Option<String>,
    pub start: NaiveDateTime,
    pub frequency: Frequency,
    pub end: Option<NaiveDateTime>,
    pub plan_id: Option<PlanId>,
}

/// A rule that could not be materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub rule_id: RecurringRuleId,
    pub message: String,
}

/// Outcome of one materialization batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Expenses written to the ledger
    pub generated: usize,
    /// Rules whose watermark moved
    pub rules_advanced: usize,
    /// Rules skipped because another run committed them first
    pub conflicts: usize,
    pub failures: Vec<RuleFailure>,
}

impl MaterializeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.conflicts == 0
    }
}

impl<'a> RecurringService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a rule; its first occurrence is `start`
    pub fn create(&self, input: CreateRuleInput) -> SpendResult<RecurringRule> {
        if input.category.trim().is_empty() {
            return Err(SpendError::Validation("Recurring category cannot be empty".into()));
        }

        let mut rule = RecurringRule::new(input.amount, input.category.trim(), input.start, input.frequency);
        rule.note = input.note.map(|n| n.trim().to_string()).unwrap_or_default();
        rule.end = input.end;
        rule.plan_id = input.plan_id;

        rule.validate()
            .map_err(|e| SpendError::Validation(e.to_string()))?;

        self.storage.recurring.upsert(rule.clone())?;
        self.storage.recurring.save()?;

        info!(rule = %rule.id, frequency = %rule.frequency, start = %rule.start, "created recurring rule");
        Ok(rule)
    }

    /// Stop a rule from generating anything after `now`
    ///
    /// The rule and everything it already generated are kept.
    pub fn terminate(&self, id: RecurringRuleId, now: NaiveDateTime) -> SpendResult<RecurringRule> {
        let mut rule = self
            .storage
            .recurring
            .get(id)?
            .ok_or_else(|| SpendError::rule_not_found(id.to_string()))?;

        if now < rule.start {
            return Err(SpendError::Validation(format!(
                "Recurring rule {} has not started yet; delete it instead",
                rule.id
            )));
        }
        if rule.end.is_some_and(|end| end <= now) {
            return Ok(rule);
        }

        rule.terminate(now);
        self.storage.recurring.upsert(rule.clone())?;
        self.storage.recurring.save()?;

        info!(rule = %rule.id, end = %now, "terminated recurring rule");
        Ok(rule)
    }

    /// Delete a rule; expenses it generated stay in the ledger
    pub fn delete(&self, id: RecurringRuleId) -> SpendResult<RecurringRule> {
        let rule = self
            .storage
            .recurring
            .get(id)?
            .ok_or_else(|| SpendError::rule_not_found(id.to_string()))?;

        self.storage.recurring.delete(id)?;
        self.storage.recurring.save()?;

        info!(rule = %rule.id, "deleted recurring rule");
        Ok(rule)
    }

    pub fn get(&self, id: RecurringRuleId) -> SpendResult<Option<RecurringRule>> {
        self.storage.recurring.get(id)
    }

    /// Find a rule by id prefix
    pub fn find(&self, identifier: &str) -> SpendResult<Option<RecurringRule>> {
        self.storage.recurring.find(identifier)
    }

    pub fn list(&self) -> SpendResult<Vec<RecurringRule>> {
        self.storage.recurring.get_all()
    }

    /// Generate every due occurrence of every rule as of `now`
    ///
    /// A rule that fails validation or loses the watermark race is logged and
    /// skipped; the remaining rules still run.
    pub fn materialize_all(&self, now: NaiveDateTime) -> SpendResult<MaterializeReport> {
        let mut report = MaterializeReport::default();

        for rule in self.storage.recurring.get_all()? {
            match self.materialize_rule(&rule, now) {
                Ok(None) => {}
                Ok(Some(written)) => {
                    report.generated += written;
                    report.rules_advanced += 1;
                }
                Err(e) if e.is_conflict() => {
                    warn!(rule = %rule.id, error = %e, "skipping recurring rule committed by another run");
                    report.conflicts += 1;
                }
                Err(e) => {
                    warn!(rule = %rule.id, error = %e, "failed to materialize recurring rule");
                    report.failures.push(RuleFailure {
                        rule_id: rule.id,
                        message: e.to_string(),
                    });
                }
            }
        }

        if report.rules_advanced > 0 {
            // Expenses first: an interrupted save is repaired by the
            // duplicate check on the next run.
            self.storage.expenses.save()?;
            self.storage.recurring.save()?;
        }

        info!(
            generated = report.generated,
            rules = report.rules_advanced,
            conflicts = report.conflicts,
            failures = report.failures.len(),
            "materialized recurring expenses"
        );
        Ok(report)
    }

    /// Materialize one rule snapshot and commit it
    ///
    /// Returns the number of expenses written, or `None` if nothing was due.
    fn materialize_rule(&self, rule: &RecurringRule, now: NaiveDateTime) -> SpendResult<Option<usize>> {
        let result = materialize(rule, now)?;
        if !result.advanced() {
            return Ok(None);
        }

        self.storage.recurring.advance_watermark(
            rule.id,
            result.previous_watermark,
            result.rule.last_generated,
        )?;

        match self.insert_generated(rule.id, result.expenses) {
            Ok(written) => {
                debug!(rule = %rule.id, written, watermark = %result.rule.last_generated, "committed recurring rule");
                Ok(Some(written))
            }
            Err(e) => {
                // Hand the occurrences back so the next run generates them again
                if let Err(rollback) = self.storage.recurring.advance_watermark(
                    rule.id,
                    result.rule.last_generated,
                    result.previous_watermark,
                ) {
                    warn!(rule = %rule.id, error = %rollback, "failed to roll back watermark");
                }
                Err(e)
            }
        }
    }

    /// Insert generated expenses not already in the ledger
    fn insert_generated(&self, rule_id: RecurringRuleId, expenses: Vec<Expense>) -> SpendResult<usize> {
        let existing: HashSet<NaiveDateTime> = self
            .storage
            .expenses
            .get_by_rule(rule_id)?
            .into_iter()
            .map(|e| e.date)
            .collect();
        let fresh: Vec<_> = expenses
            .into_iter()
            .filter(|e| !existing.contains(&e.date))
            .collect();

        let written = fresh.len();
        self.storage.expenses.insert_many(fresh)?;
        Ok(written)
    }
}
