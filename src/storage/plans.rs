//! Plan repository for JSON storage
//!
//! Manages loading and saving plans to plans.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::SpendError;
use crate::models::{Plan, PlanId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable plan data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PlanData {
    plans: Vec<Plan>,
}

/// Repository for plan persistence
pub struct PlanRepository {
    path: PathBuf,
    /// Serializes writers so the newest snapshot is always written last
    save_lock: Mutex<()>,
    data: RwLock<HashMap<PlanId, Plan>>,
}

impl PlanRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            save_lock: Mutex::new(()),
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load plans from disk
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data: PlanData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for plan in file_data.plans {
            data.insert(plan.id, plan);
        }

        debug!(count = data.len(), "loaded plans");
        Ok(())
    }

    /// Save plans to disk, ordered by start date
    pub fn save(&self) -> Result<(), SpendError> {
        let _guard = self
            .save_lock
            .lock()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire save lock: {}", e)))?;

        let plans = self.get_all()?;
        write_json_atomic(&self.path, &PlanData { plans })
    }

    pub fn get(&self, id: PlanId) -> Result<Option<Plan>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All plans, earliest start first
    pub fn get_all(&self) -> Result<Vec<Plan>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut plans: Vec<_> = data.values().cloned().collect();
        plans.sort_by(|a, b| a.start.cmp(&b.start).then(a.created_at.cmp(&b.created_at)));
        Ok(plans)
    }

    /// Plan whose range contains `date`
    pub fn get_for_date(&self, date: NaiveDate) -> Result<Option<Plan>, SpendError> {
        Ok(self.get_all()?.into_iter().find(|p| p.contains(date)))
    }

    /// Find a plan by name (case-insensitive) or id prefix
    pub fn find(&self, identifier: &str) -> Result<Option<Plan>, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        if let Some(plan) = data
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(identifier.trim()))
        {
            return Ok(Some(plan.clone()));
        }

        Ok(data.values().find(|p| p.id.matches(identifier)).cloned())
    }

    /// Insert or update a plan
    pub fn upsert(&self, plan: Plan) -> Result<(), SpendError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        debug!(plan = %plan.id, "upsert plan");
        data.insert(plan.id, plan);
        Ok(())
    }

    /// Insert or update a plan after `check` accepts it
    ///
    /// `check` sees every other stored plan and runs under the write lock, so
    /// no concurrent writer can slip in between the check and the insert.
    pub fn upsert_validated<F>(&self, plan: Plan, check: F) -> Result<(), SpendError>
    where
        F: FnOnce(&Plan, &[Plan]) -> Result<(), SpendError>,
    {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let others: Vec<Plan> = data.values().filter(|p| p.id != plan.id).cloned().collect();
        check(&plan, &others)?;

        debug!(plan = %plan.id, "upsert validated plan");
        data.insert(plan.id, plan);
        Ok(())
    }

    /// Delete a plan, returning whether it existed
    pub fn delete(&self, id: PlanId) -> Result<bool, SpendError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, SpendError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
