//! User configuration, loaded through confy
//!
//! Lives in the platform config directory under the `ticklist` app name.
//! confy writes the defaults on first run.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ticklist_core::REMOVAL_DELAY;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the store file lives in
    pub data_directory: String,
    /// Name of the JSON key-value file inside `data_directory`
    pub store_filename: String,
    /// Fade-out time between marking a task for removal and removing it
    pub removal_delay_ms: u64,
    /// Allow colored output when stdout is a terminal
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_directory = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ticklist");

        Self {
            data_directory: data_directory.to_string_lossy().into_owned(),
            store_filename: "ticklist.json".to_string(),
            removal_delay_ms: REMOVAL_DELAY.as_millis() as u64,
            color: true,
        }
    }
}

impl Config {
    /// Full path of the store file
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.data_directory).join(&self.store_filename)
    }

    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }
}
