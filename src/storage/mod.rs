//! Storage layer for Spendwise
//!
//! JSON file storage with atomic writes. Each repository keeps its entities in
//! memory behind an `RwLock` and persists them to its own file under `data/`.

pub mod expenses;
pub mod file_io;
pub mod plans;
pub mod recurring;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use plans::PlanRepository;
pub use recurring::RecurringRepository;

use crate::config::paths::SpendPaths;
use crate::error::SpendError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: SpendPaths,
    pub plans: PlanRepository,
    pub expenses: ExpenseRepository,
    pub recurring: RecurringRepository,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: SpendPaths) -> Result<Self, SpendError> {
        paths.ensure_directories()?;

        Ok(Self {
            plans: PlanRepository::new(paths.plans_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            recurring: RecurringRepository::new(paths.recurring_file()),
            paths,
        })
    }

    /// Create storage and load everything from disk
    pub fn open(paths: SpendPaths) -> Result<Self, SpendError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &SpendPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), SpendError> {
        self.plans.load()?;
        self.expenses.load()?;
        self.recurring.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), SpendError> {
        self.plans.save()?;
        self.expenses.save()?;
        self.recurring.save()?;
        Ok(())
    }

    /// Check if storage has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
