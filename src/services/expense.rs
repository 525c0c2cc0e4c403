//! Expense service
//!
//! Logging, editing and listing expenses. The plan an expense belongs to is
//! always decided by its date; `plan_id` is filled in for reference only.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, ExpenseId, Money, Necessity, PlanId};
use crate::storage::Storage;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Options for filtering expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive category match
    pub category: Option<String>,
    /// Drop expenses flagged `exclude_from_budget`
    pub budget_only: bool,
    /// Only expenses generated by recurring rules
    pub recurring_only: bool,
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn budget_only(mut self) -> Self {
        self.budget_only = true;
        self
    }

    pub fn recurring_only(mut self) -> Self {
        self.recurring_only = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for logging a new expense
#[derive(Debug, Clone, Default)]
pub struct CreateExpenseInput {
    pub date: NaiveDateTime,
    pub amount: Money,
    pub category: String,
    pub note: Option<String>,
    pub merchant: Option<String>,
    pub payment_method: Option<String>,
    pub image_ref: Option<String>,
    pub necessity: Option<Necessity>,
    pub exclude_from_budget: bool,
}

/// Fields to change on an existing expense; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub date: Option<NaiveDateTime>,
    pub amount: Option<Money>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub merchant: Option<String>,
    pub payment_method: Option<String>,
    pub necessity: Option<Necessity>,
    pub exclude_from_budget: Option<bool>,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Log a new expense
    pub fn create(&self, input: CreateExpenseInput) -> SpendResult<Expense> {
        let mut expense = Expense::new(input.date, input.amount, input.category.trim());
        expense.note = input.note.map(|n| n.trim().to_string()).unwrap_or_default();
        expense.merchant = non_blank(input.merchant);
        expense.payment_method = non_blank(input.payment_method);
        expense.image_ref = non_blank(input.image_ref);
        expense.necessity = input.necessity;
        expense.exclude_from_budget = input.exclude_from_budget;

        validate_expense(&expense)?;
        expense.plan_id = self.plan_for(expense.day())?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        info!(expense = %expense.id, amount = %expense.amount, date = %expense.date, "logged expense");
        Ok(expense)
    }

    /// Edit an existing expense
    pub fn update(&self, id: ExpenseId, input: UpdateExpenseInput) -> SpendResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;

        if let Some(date) = input.date {
            expense.date = date;
        }
        if let Some(amount) = input.amount {
            expense.amount = amount;
        }
        if let Some(category) = input.category {
            expense.category = category.trim().to_string();
        }
        if let Some(note) = input.note {
            expense.note = note.trim().to_string();
        }
        if input.merchant.is_some() {
            expense.merchant = non_blank(input.merchant);
        }
        if input.payment_method.is_some() {
            expense.payment_method = non_blank(input.payment_method);
        }
        if let Some(necessity) = input.necessity {
            expense.necessity = Some(necessity);
        }
        if let Some(exclude) = input.exclude_from_budget {
            expense.exclude_from_budget = exclude;
        }

        validate_expense(&expense)?;
        expense.plan_id = self.plan_for(expense.day())?;
        expense.touch();

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        info!(expense = %expense.id, "updated expense");
        Ok(expense)
    }

    /// Delete an expense
    pub fn delete(&self, id: ExpenseId) -> SpendResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;

        self.storage.expenses.delete(id)?;
        self.storage.expenses.save()?;

        info!(expense = %expense.id, "deleted expense");
        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> SpendResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense by id prefix
    pub fn find(&self, identifier: &str) -> SpendResult<Option<Expense>> {
        self.storage.expenses.find(identifier)
    }

    /// List expenses, oldest first
    pub fn list(&self, filter: ExpenseFilter) -> SpendResult<Vec<Expense>> {
        let mut expenses = match (filter.start_date, filter.end_date) {
            (Some(start), Some(end)) => self.storage.expenses.get_in_range(start, end)?,
            _ => self.storage.expenses.get_all()?,
        };

        if let Some(start) = filter.start_date {
            expenses.retain(|e| e.day() >= start);
        }
        if let Some(end) = filter.end_date {
            expenses.retain(|e| e.day() <= end);
        }
        if let Some(category) = &filter.category {
            expenses.retain(|e| e.category.eq_ignore_ascii_case(category.trim()));
        }
        if filter.budget_only {
            expenses.retain(Expense::counts_against_budget);
        }
        if filter.recurring_only {
            expenses.retain(Expense::is_recurring);
        }

        if let Some(limit) = filter.limit {
            // Keep the most recent entries
            let skip = expenses.len().saturating_sub(limit);
            expenses = expenses.split_off(skip);
        }

        Ok(expenses)
    }

    /// Expenses dated inside a plan's range
    pub fn list_for_plan(&self, plan_id: PlanId) -> SpendResult<Vec<Expense>> {
        let plan = self
            .storage
            .plans
            .get(plan_id)?
            .ok_or_else(|| SpendError::plan_not_found(plan_id.to_string()))?;

        self.storage
            .expenses
            .get_in_range(plan.start, plan.end.max(plan.start))
    }

    /// Delete every expense dated inside a plan's range, returning the count
    pub fn clear_plan_expenses(&self, plan_id: PlanId) -> SpendResult<usize> {
        let plan = self
            .storage
            .plans
            .get(plan_id)?
            .ok_or_else(|| SpendError::plan_not_found(plan_id.to_string()))?;

        let removed = self
            .storage
            .expenses
            .delete_in_range(plan.start, plan.end.max(plan.start))?;
        self.storage.expenses.save()?;

        info!(plan = %plan.id, removed, "cleared plan expenses");
        Ok(removed)
    }

    fn plan_for(&self, day: NaiveDate) -> SpendResult<Option<PlanId>> {
        Ok(self.storage.plans.get_for_date(day)?.map(|p| p.id))
    }
}

fn validate_expense(expense: &Expense) -> SpendResult<()> {
    if !expense.amount.is_positive() {
        return Err(SpendError::Validation(format!(
            "Expense amount must be positive, got {}",
            expense.amount
        )));
    }
    if expense.amount.exceeds_max() {
        return Err(SpendError::Validation(format!(
            "Expense amount cannot exceed {}",
            Money::MAX_AMOUNT
        )));
    }
    if expense.category.trim().is_empty() {
        return Err(SpendError::Validation("Expense category cannot be empty".into()));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendPaths;
    use crate::models::Plan;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(d: NaiveDate) -> NaiveDateTime {
        d.and_hms_opt(12, 0, 0).unwrap()
    }

    fn input(day: NaiveDate, amount: i64, category: &str) -> CreateExpenseInput {
        CreateExpenseInput {
            date: noon(day),
            amount: Money::from_units(amount),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_links_covering_plan() {
        let (_temp_dir, storage) = create_test_storage();
        let plan = Plan::new("May", date(2025, 5, 1), date(2025, 5, 31), Money::from_units(310), Money::zero());
        storage.plans.upsert(plan.clone()).unwrap();
        let service = ExpenseService::new(&storage);

        let inside = service.create(input(date(2025, 5, 4), 12, "Lunch")).unwrap();
        let outside = service.create(input(date(2025, 6, 4), 12, "Lunch")).unwrap();

        assert_eq!(inside.plan_id, Some(plan.id));
        assert_eq!(outside.plan_id, None);
        assert_eq!(service.list_for_plan(plan.id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        assert!(service.create(input(date(2025, 5, 4), 0, "Lunch")).unwrap_err().is_validation());
        assert!(service.create(input(date(2025, 5, 4), -3, "Lunch")).is_err());
        assert!(service.create(input(date(2025, 5, 4), 3, "  ")).is_err());
        assert_eq!(storage.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_amount_above_max() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let err = service.create(input(date(2025, 5, 4), i64::MAX, "Yacht")).unwrap_err();
        assert!(err.is_validation());
        assert!(service
            .create(input(date(2025, 5, 4), Money::MAX_AMOUNT.units(), "Yacht"))
            .is_ok());
        assert_eq!(storage.expenses.count().unwrap(), 1);
    }

    #[test]
    fn test_update_moves_expense() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let e = service.create(input(date(2025, 5, 4), 12, "Lunch")).unwrap();

        let updated = service
            .update(
                e.id,
                UpdateExpenseInput {
                    date: Some(noon(date(2025, 5, 9))),
                    exclude_from_budget: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(updated.exclude_from_budget);
        assert!(service
            .list(ExpenseFilter::new().date_range(date(2025, 5, 4), date(2025, 5, 4)))
            .unwrap()
            .is_empty());
        assert!(service
            .list(ExpenseFilter::new().budget_only())
            .unwrap()
            .is_empty());
        assert_eq!(service.list(ExpenseFilter::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_list_filters() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        for (day, category) in [(1, "Food"), (2, "Transport"), (3, "food"), (4, "Food")] {
            service.create(input(date(2025, 7, day), 10, category)).unwrap();
        }

        let food = service.list(ExpenseFilter::new().category("FOOD")).unwrap();
        assert_eq!(food.len(), 3);

        let latest = service.list(ExpenseFilter::new().limit(2)).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[1].day(), date(2025, 7, 4));
    }

    #[test]
    fn test_clear_plan_expenses() {
        let (_temp_dir, storage) = create_test_storage();
        let plan = Plan::new("Week", date(2025, 5, 1), date(2025, 5, 7), Money::from_units(70), Money::zero());
        storage.plans.upsert(plan.clone()).unwrap();
        let service = ExpenseService::new(&storage);

        service.create(input(date(2025, 5, 1), 5, "Food")).unwrap();
        service.create(input(date(2025, 5, 7), 5, "Food")).unwrap();
        service.create(input(date(2025, 5, 8), 5, "Food")).unwrap();

        assert_eq!(service.clear_plan_expenses(plan.id).unwrap(), 2);
        assert_eq!(storage.expenses.count().unwrap(), 1);
        assert!(service.clear_plan_expenses(PlanId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_missing_expense() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        assert!(service.delete(ExpenseId::new()).unwrap_err().is_not_found());
    }
}
