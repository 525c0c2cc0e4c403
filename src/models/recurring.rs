//! Recurring rule model
//!
//! A recurring rule describes a periodic charge (rent, subscriptions) that is
//! turned into concrete expenses over time. The `last_generated` watermark
//! records the newest occurrence already emitted; the next occurrence is one
//! interval after it.

use chrono::{DateTime, Duration, Months, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::expense::{Expense, ExpenseSource};
use super::ids::{PlanId, RecurringRuleId};
use super::money::Money;

/// How often a recurring rule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    EveryNDays { days: u32 },
}

impl Frequency {
    pub fn every_n_days(days: u32) -> Self {
        Self::EveryNDays { days }
    }

    /// Fixed step in days, or `None` for calendar-month steps
    fn step_days(&self) -> Option<i64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Monthly => None,
            Self::EveryNDays { days } => Some(i64::from(*days)),
        }
    }

    /// One interval after `anchor`
    ///
    /// Monthly steps clamp to the last day of shorter months, and the series
    /// continues from the clamped day (Jan 31 -> Feb 28 -> Mar 28).
    pub fn advance(&self, anchor: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.step_days() {
            Some(0) => None,
            Some(step) => anchor.checked_add_signed(Duration::days(step)),
            None => anchor.checked_add_months(Months::new(1)),
        }
    }

    /// One interval before `anchor`
    pub fn step_back(&self, anchor: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.step_days() {
            Some(step) => anchor.checked_sub_signed(Duration::days(step)),
            None => anchor.checked_sub_months(Months::new(1)),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Daily => "Daily".to_string(),
            Self::Weekly => "Weekly".to_string(),
            Self::Monthly => "Monthly".to_string(),
            Self::EveryNDays { days } => format!("Every {} days", days),
        }
    }

    /// Parse a frequency name: "daily", "weekly", "monthly" or a day count
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Some(Self::Daily),
            "weekly" | "week" => Some(Self::Weekly),
            "monthly" | "month" => Some(Self::Monthly),
            other => {
                let days = other.strip_suffix('d').unwrap_or(other);
                days.parse().ok().map(|days| Self::EveryNDays { days })
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A template for a periodic charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    /// Unique identifier
    pub id: RecurringRuleId,

    /// Amount charged per occurrence
    pub amount: Money,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub note: String,

    /// First occurrence
    pub start: NaiveDateTime,

    pub frequency: Frequency,

    /// Last instant an occurrence may fall on (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,

    /// Newest occurrence already turned into an expense
    pub last_generated: NaiveDateTime,

    /// Plan the rule was created under (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringRule {
    /// Create a new rule whose first occurrence is `start`
    pub fn new(
        amount: Money,
        category: impl Into<String>,
        start: NaiveDateTime,
        frequency: Frequency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecurringRuleId::new(),
            amount,
            category: category.into(),
            note: String::new(),
            start,
            frequency,
            end: None,
            last_generated: Self::initial_watermark(start, frequency),
            plan_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Watermark for a fresh rule: one interval before `start`
    pub fn initial_watermark(start: NaiveDateTime, frequency: Frequency) -> NaiveDateTime {
        frequency.step_back(start).unwrap_or(NaiveDateTime::MIN)
    }

    /// First occurrence strictly after `watermark`
    ///
    /// A watermark before `start` means nothing has been generated yet, so
    /// the first occurrence is `start` itself even when stepping back a month
    /// clamped the initial watermark (Mar 31 -> Feb 28).
    pub fn next_occurrence_after(&self, watermark: NaiveDateTime) -> Option<NaiveDateTime> {
        let next = self.frequency.advance(watermark)?;
        Some(if watermark < self.start { self.start } else { next })
    }

    /// Next occurrence that has not been generated yet
    pub fn next_due(&self) -> Option<NaiveDateTime> {
        self.next_occurrence_after(self.last_generated)
    }

    /// Whether `instant` is within the rule's end bound
    pub fn allows(&self, instant: NaiveDateTime) -> bool {
        self.end.map_or(true, |end| instant <= end)
    }

    /// A rule is dormant once its next occurrence lies past its end date
    pub fn is_dormant(&self) -> bool {
        match self.next_due() {
            Some(next) => !self.allows(next),
            None => true,
        }
    }

    /// Stop generating occurrences after `now`
    pub fn terminate(&mut self, now: NaiveDateTime) {
        self.end = Some(now);
        self.touch();
    }

    /// Build the expense for one occurrence of this rule
    pub fn expense_for(&self, occurrence: NaiveDateTime) -> Expense {
        let mut expense = Expense::new(occurrence, self.amount, self.category.clone());
        expense.note = if self.note.trim().is_empty() {
            "(auto)".to_string()
        } else {
            format!("{} (auto)", self.note.trim())
        };
        expense.plan_id = self.plan_id;
        expense.source = ExpenseSource::Recurring { rule_id: self.id };
        expense
    }

    /// Validate the rule
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if let Frequency::EveryNDays { days: 0 } = self.frequency {
            return Err(RuleValidationError::ZeroInterval);
        }
        if !self.amount.is_positive() {
            return Err(RuleValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount.exceeds_max() {
            return Err(RuleValidationError::AmountTooLarge(self.amount));
        }
        if let Some(end) = self.end {
            if end < self.start {
                return Err(RuleValidationError::EndBeforeStart);
            }
        }
        Ok(())
    }

    /// Mark the rule as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Validation errors for recurring rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValidationError {
    ZeroInterval,
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EndBeforeStart,
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "Custom interval must be at least one day"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Recurring amount must be positive, got {}", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Recurring amount cannot exceed {}, got {}", Money::MAX_AMOUNT, amount)
            }
            Self::EndBeforeStart => write!(f, "End date is before the start date"),
        }
    }
}

impl std::error::Error for RuleValidationError {}
