//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json. Expenses are also
//! indexed by calendar day, since every engine query is a day-range query.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::SpendError;
use crate::models::{Expense, ExpenseId, ExpenseSource, RecurringRuleId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence with a per-day index
pub struct ExpenseRepository {
    path: PathBuf,
    /// Serializes writers so the newest snapshot is always written last
    save_lock: Mutex<()>,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: calendar day -> expense ids
    by_day: RwLock<BTreeMap<NaiveDate, Vec<ExpenseId>>>,
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            save_lock: Mutex::new(()),
            data: RwLock::new(HashMap::new()),
            by_day: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load expenses from disk and rebuild the day index
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_day = self
            .by_day
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_day.clear();

        for expense in file_data.expenses {
            by_day.entry(expense.day()).or_default().push(expense.id);
            data.insert(expense.id, expense);
        }

        debug!(count = data.len(), "loaded expenses");
        Ok(())
    }

    /// Save expenses to disk, newest first
    pub fn save(&self) -> Result<(), SpendError> {
        let _guard = self
            .save_lock
            .lock()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire save lock: {}", e)))?;

        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All expenses, oldest first
    pub fn get_all(&self) -> Result<Vec<Expense>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(expenses)
    }

    /// Expenses whose day falls in `[start, end]`, oldest first
    pub fn get_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>, SpendError> {
        if end < start {
            return Ok(Vec::new());
        }

        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_day = self
            .by_day
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut expenses: Vec<_> = by_day
            .range(start..=end)
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| data.get(id).cloned())
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(expenses)
    }

    /// Expenses generated by a recurring rule
    pub fn get_by_rule(&self, rule_id: RecurringRuleId) -> Result<Vec<Expense>, SpendError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|e| e.source == ExpenseSource::Recurring { rule_id })
            .collect())
    }

    /// Find an expense by id prefix
    pub fn find(&self, identifier: &str) -> Result<Option<Expense>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.values().find(|e| e.id.matches(identifier)).cloned())
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), SpendError> {
        self.insert_many(vec![expense])
    }

    /// Insert or update several expenses under one lock
    pub fn insert_many(&self, expenses: Vec<Expense>) -> Result<(), SpendError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_day = self
            .by_day
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        for expense in expenses {
            // Remove from the old day if the date moved
            if let Some(old) = data.get(&expense.id) {
                if let Some(ids) = by_day.get_mut(&old.day()) {
                    ids.retain(|&id| id != expense.id);
                }
            }

            by_day.entry(expense.day()).or_default().push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Delete an expense, returning whether it existed
    pub fn delete(&self, id: ExpenseId) -> Result<bool, SpendError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_day = self
            .by_day
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match data.remove(&id) {
            Some(expense) => {
                if let Some(ids) = by_day.get_mut(&expense.day()) {
                    ids.retain(|&eid| eid != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every expense dated in `[start, end]`, returning how many went
    pub fn delete_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<usize, SpendError> {
        if end < start {
            return Ok(0);
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_day = self
            .by_day
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let days: Vec<NaiveDate> = by_day.range(start..=end).map(|(day, _)| *day).collect();
        let mut removed = 0;
        for day in days {
            if let Some(ids) = by_day.remove(&day) {
                for id in ids {
                    if data.remove(&id).is_some() {
                        removed += 1;
                    }
                }
            }
        }

        debug!(removed, %start, %end, "deleted expenses in range");
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }

    /// Poison the day index so the next write fails
    #[cfg(test)]
    pub(crate) fn poison_index(&self) {
        let by_day = &self.by_day;
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = by_day.write();
                    panic!("poisoning expense index");
                })
                .join()
        });
    }
}
