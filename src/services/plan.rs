//! Plan service
//!
//! Plan CRUD guarded by the validator, plus the allocation, calendar and
//! focus views computed from a fresh store snapshot on every call.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use tracing::{debug, info};

use crate::engine::{
    compute_daily_allocations, compute_focus, compute_month_grid, days_in_month, select_focus_plan,
    suggest_next_range, validate_plan, DailyAllocation, FocusSummary, MonthGrid,
};
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, Money, Plan, PlanId};
use crate::storage::Storage;

/// Service for plan management and plan-derived views
pub struct PlanService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new plan
#[derive(Debug, Clone)]
pub struct CreatePlanInput {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_budget: Money,
    pub target_savings: Money,
}

/// Fields to change on an existing plan; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct UpdatePlanInput {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub total_budget: Option<Money>,
    pub target_savings: Option<Money>,
    pub active: Option<bool>,
}

impl UpdatePlanInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.total_budget.is_none()
            && self.target_savings.is_none()
            && self.active.is_none()
    }
}

impl<'a> PlanService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new plan
    ///
    /// Fails without writing anything if the plan is invalid or overlaps an
    /// existing one.
    pub fn create(&self, input: CreatePlanInput) -> SpendResult<Plan> {
        let plan = Plan::new(
            input.name.trim(),
            input.start,
            input.end,
            input.total_budget,
            input.target_savings,
        );

        self.storage.plans.upsert_validated(plan.clone(), validate_plan)?;
        self.storage.plans.save()?;

        info!(plan = %plan.id, name = %plan.name, start = %plan.start, end = %plan.end, "created plan");
        Ok(plan)
    }

    /// Update an existing plan
    pub fn update(&self, id: PlanId, input: UpdatePlanInput) -> SpendResult<Plan> {
        let mut plan = self
            .storage
            .plans
            .get(id)?
            .ok_or_else(|| SpendError::plan_not_found(id.to_string()))?;

        if let Some(name) = input.name {
            plan.name = name.trim().to_string();
        }
        if let Some(start) = input.start {
            plan.start = start;
        }
        if let Some(end) = input.end {
            plan.end = end;
        }
        if let Some(total_budget) = input.total_budget {
            plan.total_budget = total_budget;
        }
        if let Some(target_savings) = input.target_savings {
            plan.target_savings = target_savings;
        }
        if let Some(active) = input.active {
            plan.active = active;
        }
        plan.touch();

        self.storage.plans.upsert_validated(plan.clone(), validate_plan)?;
        self.storage.plans.save()?;

        info!(plan = %plan.id, "updated plan");
        Ok(plan)
    }

    /// Delete a plan; its expenses stay in the ledger
    pub fn delete(&self, id: PlanId) -> SpendResult<Plan> {
        let plan = self
            .storage
            .plans
            .get(id)?
            .ok_or_else(|| SpendError::plan_not_found(id.to_string()))?;

        self.storage.plans.delete(id)?;
        self.storage.plans.save()?;

        info!(plan = %plan.id, name = %plan.name, "deleted plan");
        Ok(plan)
    }

    pub fn get(&self, id: PlanId) -> SpendResult<Option<Plan>> {
        self.storage.plans.get(id)
    }

    /// Find a plan by name or id prefix
    pub fn find(&self, identifier: &str) -> SpendResult<Option<Plan>> {
        self.storage.plans.find(identifier)
    }

    /// Like [`find`](Self::find), but a missing plan is an error
    pub fn resolve(&self, identifier: &str) -> SpendResult<Plan> {
        self.find(identifier)?
            .ok_or_else(|| SpendError::plan_not_found(identifier))
    }

    /// All plans, earliest first
    pub fn list(&self) -> SpendResult<Vec<Plan>> {
        self.storage.plans.get_all()
    }

    /// The plan covering `date`, if any
    pub fn find_for_date(&self, date: NaiveDate) -> SpendResult<Option<Plan>> {
        self.storage.plans.get_for_date(date)
    }

    /// Per-day allocations for a plan as of `now`
    pub fn allocations(&self, id: PlanId, now: NaiveDateTime) -> SpendResult<Vec<DailyAllocation>> {
        let plan = self
            .storage
            .plans
            .get(id)?
            .ok_or_else(|| SpendError::plan_not_found(id.to_string()))?;

        let expenses = self.expenses_for(&plan)?;
        Ok(compute_daily_allocations(&plan, &expenses, now))
    }

    /// Calendar grid for one month across every plan that touches it
    pub fn month_grid(
        &self,
        year: i32,
        month: u32,
        now: NaiveDateTime,
        week_start: Weekday,
    ) -> SpendResult<MonthGrid> {
        let total_days = days_in_month(year, month)
            .ok_or_else(|| SpendError::Validation(format!("Invalid month: {}-{}", year, month)))?;
        let month_start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| SpendError::Validation(format!("Invalid month: {}-{}", year, month)))?;
        let month_end = month_start
            .with_day(total_days)
            .ok_or_else(|| SpendError::Validation(format!("Invalid month: {}-{}", year, month)))?;

        let plans: Vec<Plan> = self
            .storage
            .plans
            .get_all()?
            .into_iter()
            .filter(|p| p.overlaps_range(month_start, month_end))
            .collect();

        // Carry-over needs every expense of each plan, not just this month's.
        let expenses = match (
            plans.iter().map(|p| p.start).min(),
            plans.iter().map(|p| p.end.max(p.start)).max(),
        ) {
            (Some(start), Some(end)) => self.storage.expenses.get_in_range(start, end)?,
            _ => Vec::new(),
        };

        debug!(year, month, plans = plans.len(), expenses = expenses.len(), "building month grid");
        compute_month_grid(year, month, &plans, &expenses, now, week_start)
    }

    /// Focus summary for the plan most relevant to `now`
    pub fn focus(&self, now: NaiveDateTime) -> SpendResult<Option<FocusSummary>> {
        let plans = self.storage.plans.get_all()?;
        let Some(plan) = select_focus_plan(&plans, now.date()) else {
            return Ok(None);
        };

        let expenses = self.expenses_for(plan)?;
        Ok(Some(compute_focus(plan, &expenses, now)))
    }

    /// Focus summary for a specific plan
    pub fn focus_on(&self, id: PlanId, now: NaiveDateTime) -> SpendResult<FocusSummary> {
        let plan = self
            .storage
            .plans
            .get(id)?
            .ok_or_else(|| SpendError::plan_not_found(id.to_string()))?;

        let expenses = self.expenses_for(&plan)?;
        Ok(compute_focus(&plan, &expenses, now))
    }

    /// Date range for a new plan that won't collide with existing ones
    pub fn suggest_range(&self, today: NaiveDate) -> SpendResult<(NaiveDate, NaiveDate)> {
        let plans = self.storage.plans.get_all()?;
        Ok(suggest_next_range(&plans, today))
    }

    fn expenses_for(&self, plan: &Plan) -> SpendResult<Vec<Expense>> {
        self.storage
            .expenses
            .get_in_range(plan.start, plan.end.max(plan.start))
    }
}
