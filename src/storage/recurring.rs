//! Recurring rule repository for JSON storage
//!
//! Manages loading and saving recurring rules to recurring.json. The watermark
//! is only ever moved through [`RecurringRepository::advance_watermark`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use chrono::{NaiveDateTime, Utc};
use tracing::debug;

use crate::error::SpendError;
use crate::models::{RecurringRule, RecurringRuleId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable rule data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RecurringData {
    rules: Vec<RecurringRule>,
}

/// Repository for recurring rule persistence
pub struct RecurringRepository {
    path: PathBuf,
    /// Serializes writers so the newest snapshot is always written last
    save_lock: Mutex<()>,
    data: RwLock<HashMap<RecurringRuleId, RecurringRule>>,
}

impl RecurringRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            save_lock: Mutex::new(()),
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load rules from disk
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data: RecurringData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for rule in file_data.rules {
            data.insert(rule.id, rule);
        }

        debug!(count = data.len(), "loaded recurring rules");
        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendError> {
        let _guard = self
            .save_lock
            .lock()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire save lock: {}", e)))?;

        let rules = self.get_all()?;
        write_json_atomic(&self.path, &RecurringData { rules })
    }

    pub fn get(&self, id: RecurringRuleId) -> Result<Option<RecurringRule>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All rules, oldest start first
    pub fn get_all(&self) -> Result<Vec<RecurringRule>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut rules: Vec<_> = data.values().cloned().collect();
        rules.sort_by(|a, b| a.start.cmp(&b.start).then(a.created_at.cmp(&b.created_at)));
        Ok(rules)
    }

    /// Find a rule by id prefix
    pub fn find(&self, identifier: &str) -> Result<Option<RecurringRule>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.values().find(|r| r.id.matches(identifier)).cloned())
    }

    /// Insert or update a rule
    pub fn upsert(&self, rule: RecurringRule) -> Result<(), SpendError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        debug!(rule = %rule.id, "upsert recurring rule");
        data.insert(rule.id, rule);
        Ok(())
    }

    /// Delete a rule, returning whether it existed
    pub fn delete(&self, id: RecurringRuleId) -> Result<bool, SpendError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Move a rule's watermark from `expected` to `new` atomically
    ///
    /// Fails with [`SpendError::Conflict`] when the stored watermark is no
    /// longer `expected`, i.e. another run already committed this rule.
    pub fn advance_watermark(
        &self,
        id: RecurringRuleId,
        expected: NaiveDateTime,
        new: NaiveDateTime,
    ) -> Result<(), SpendError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let rule = data
            .get_mut(&id)
            .ok_or_else(|| SpendError::rule_not_found(id.to_string()))?;

        if rule.last_generated != expected {
            return Err(SpendError::Conflict(format!(
                "Recurring rule {} moved from {} to {} during materialization",
                id, expected, rule.last_generated
            )));
        }

        rule.last_generated = new;
        rule.updated_at = Utc::now();
        debug!(rule = %id, %expected, %new, "advanced watermark");
        Ok(())
    }

    pub fn count(&self) -> Result<usize, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
