mod config;
pub mod database;
mod memory;

pub use config::{
    BrandingConfig, NotificationsConfig, Preferences, ScheduleConfig, SoundConfig, SoundLevel,
    BREAK_MINUTES_RANGE, LONG_BREAK_EVERY_RANGE, WORK_MINUTES_RANGE,
};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, Result};

/// Key of the persisted [`crate::TimerState`] blob.
pub const TIMER_STATE_KEY: &str = "timer-state";
/// Key of the persisted [`crate::HistoryLedger`] blob.
pub const HISTORY_KEY: &str = "history";

/// Returns the data directory, creating it if needed.
///
/// `POMOCLOCK_HOME` overrides the location outright. Otherwise this is
/// `~/.config/pomoclock[-dev]/`, with `POMOCLOCK_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOCLOCK_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOCLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomoclock-dev")
            } else {
                base_dir.join("pomoclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// A whole-record key-value store.
///
/// Every write replaces one complete blob, so a reader never observes a
/// partially updated record.
pub trait KvStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>>;
    fn kv_set(&self, key: &str, value: &str) -> Result<()>;
    fn kv_delete(&self, key: &str) -> Result<()>;

    /// Write several records together. Stores that can commit them as one
    /// unit override this; the default writes them in order.
    fn kv_set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.kv_set(key, value)?;
        }
        Ok(())
    }
}

impl<K: KvStore + ?Sized> KvStore for &K {
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        (**self).kv_set(key, value)
    }

    fn kv_delete(&self, key: &str) -> Result<()> {
        (**self).kv_delete(key)
    }

    fn kv_set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        (**self).kv_set_many(entries)
    }
}

/// Read a JSON blob, treating a malformed record as absent.
///
/// # Errors
/// Only store-level failures propagate.
pub fn load_json<T: DeserializeOwned>(store: &impl KvStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.kv_get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed persisted record, falling back to default");
            Ok(None)
        }
    }
}

/// Write a JSON blob as a single record.
pub fn save_json<T: Serialize>(store: &impl KvStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.kv_set(key, &json)
}
