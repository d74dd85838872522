use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding one workbook per day
const DAILY_ENTRY_DIRECTORY: &str = "Daily Entry";
/// Directory holding one JSON event log per day
const LOGS_DIRECTORY: &str = "Logs";
const SUBSCRIBER_CACHE_FILE: &str = "Subscriber Data.csv";
const CONFIG_FILE: &str = "config.yaml";

/// CsvConnection manages the file layout of the data directory
///
/// ```text
/// <base>/
/// ├── config.yaml
/// ├── Subscriber Data.csv
/// ├── Daily Entry/<day id>/<sheet>.csv
/// └── Logs/<day id>.json
/// ```
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a new CSV connection in the default data directory (~/Documents/SRM Entry)
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_data_directory()?)
    }

    /// Get the default data directory path
    pub fn default_data_directory() -> Result<PathBuf> {
        let documents_dir = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(documents_dir.join("SRM Entry"))
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        self.base_directory.clone()
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_directory.join(CONFIG_FILE)
    }

    pub fn subscriber_cache_path(&self) -> PathBuf {
        self.base_directory.join(SUBSCRIBER_CACHE_FILE)
    }

    /// Directory of the local workbook for a day
    pub fn day_workbook_path(&self, day_id: &str) -> PathBuf {
        self.base_directory.join(DAILY_ENTRY_DIRECTORY).join(day_id)
    }

    /// Path of the JSON event log for a day; the logs directory is created on demand
    pub fn event_log_path(&self, day_id: &str) -> Result<PathBuf> {
        let logs_dir = self.base_directory.join(LOGS_DIRECTORY);
        if !logs_dir.exists() {
            fs::create_dir_all(&logs_dir)?;
        }
        Ok(logs_dir.join(format!("{}.json", day_id)))
    }
}
