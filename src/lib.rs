//! Spendwise - daily budget allocation and recurring expense tracking
//!
//! A budget plan covers a closed range of days with a total budget and a
//! savings target. Whatever is left after savings is split into an equal
//! daily limit; unspent money carries forward to later days and overspending
//! is taken out of them. Recurring rules generate expenses on schedule.
//!
//! # Architecture
//!
//! - `config`: Data directory resolution and user settings
//! - `error`: Custom error types
//! - `models`: Plans, expenses, recurring rules, money and ids
//! - `engine`: Pure computations (allocation, calendar, recurrence, validation)
//! - `storage`: JSON file repositories
//! - `services`: Business logic over storage
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use spendwise::config::{SpendPaths, Settings};
//! use spendwise::storage::Storage;
//!
//! let paths = SpendPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! ```

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{SpendError, SpendResult};

static TRACING: Once = Once::new();

/// Install the stderr tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more than
/// once is a no-op.
pub fn init_tracing(default_filter: &str) {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
