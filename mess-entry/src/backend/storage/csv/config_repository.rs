//! # Config Repository
//!
//! Loads the station configuration from `config.yaml` at the root of the data
//! directory, creating a default file on first run.
//!
//! ## YAML Format
//!
//! ```yaml
//! facility_id: "5"
//! scaling: 0.8
//! file_label: SRM Data
//! mirror_directory: /mnt/mess-drive
//! non_veg_surcharge: "30"
//! batch_prefixes: [MS25, MS24, MS23]
//! batch_suffix_width: 3
//! share_recipients: [studentmess@iisermohali.ac.in]
//! ```
//!
//! `facility_id` is required once the file exists. `scaling` is validated:
//! values outside 0.5..=3.0 are kept with a warning, anything non-numeric
//! falls back to 1.0.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use shared::LogLevel;
use std::fs;
use std::path::PathBuf;

use super::connection::CsvConnection;

const DEFAULT_SCALING: f64 = 0.8;
const FALLBACK_SCALING: f64 = 1.0;
const MIN_SCALING: f64 = 0.5;
const MAX_SCALING: f64 = 3.0;

/// A sheet inside a named document of the mirror service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRef {
    pub document: String,
    pub sheet: String,
}

/// Column positions of the leave form responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaveColumns {
    pub registration: usize,
    pub start_date: usize,
    pub end_date: usize,
}

impl Default for LeaveColumns {
    fn default() -> Self {
        Self {
            registration: 3,
            start_date: 5,
            end_date: 6,
        }
    }
}

/// Externally maintained documents read during synchronisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Describes where the subscriber forms live
    pub repository_details: SheetRef,
    /// Aggregated subscriber list published back to the mirror
    pub subscriber_repository: SheetRef,
    pub leave_document: String,
    pub leave_responses_sheet: String,
    pub current_leave_sheet: String,
    pub leave_columns: LeaveColumns,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository_details: SheetRef {
                document: "Repository Details for SRM".to_string(),
                sheet: "Sheet1".to_string(),
            },
            subscriber_repository: SheetRef {
                document: "Repository for SRM".to_string(),
                sheet: "Sheet1".to_string(),
            },
            leave_document: "Leave Details for SRM".to_string(),
            leave_responses_sheet: "Form Responses 1".to_string(),
            current_leave_sheet: "Current Leave Details".to_string(),
            leave_columns: LeaveColumns::default(),
        }
    }
}

/// Validated station configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub facility_id: String,
    pub scaling: f64,
    pub file_label: String,
    /// Root of the mirror service; online sync is disabled when absent
    pub mirror_directory: Option<PathBuf>,
    pub non_veg_surcharge: String,
    pub batch_prefixes: Vec<String>,
    pub batch_suffix_width: usize,
    pub share_recipients: Vec<String>,
    pub sources: SourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            facility_id: "5".to_string(),
            scaling: DEFAULT_SCALING,
            file_label: "SRM Data".to_string(),
            mirror_directory: None,
            non_veg_surcharge: "30".to_string(),
            batch_prefixes: vec!["MS25".to_string(), "MS24".to_string(), "MS23".to_string()],
            batch_suffix_width: 3,
            share_recipients: vec!["studentmess@iisermohali.ac.in".to_string()],
            sources: SourceConfig::default(),
        }
    }
}

/// A problem found while validating the configuration, surfaced to the operator
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// On-disk shape; loosely typed where operators tend to write numbers or strings
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    facility_id: Option<Value>,
    scaling: Option<Value>,
    file_label: String,
    mirror_directory: Option<PathBuf>,
    non_veg_surcharge: Option<Value>,
    batch_prefixes: Vec<String>,
    batch_suffix_width: usize,
    share_recipients: Vec<String>,
    sources: SourceConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = AppConfig::default();
        Self {
            facility_id: None,
            scaling: None,
            file_label: defaults.file_label,
            mirror_directory: None,
            non_veg_surcharge: None,
            batch_prefixes: defaults.batch_prefixes,
            batch_suffix_width: defaults.batch_suffix_width,
            share_recipients: defaults.share_recipients,
            sources: defaults.sources,
        }
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn validate_scaling(value: Option<&Value>, warnings: &mut Vec<ConfigWarning>) -> f64 {
    let Some(value) = value else {
        return DEFAULT_SCALING;
    };
    match value.as_f64() {
        Some(scaling) => {
            if !(MIN_SCALING..=MAX_SCALING).contains(&scaling) {
                warnings.push(ConfigWarning {
                    level: LogLevel::Warning,
                    message: format!(
                        "Warning: 'scaling' value {} is outside the recommended range ({} to {}). Using the provided value.",
                        scaling, MIN_SCALING, MAX_SCALING
                    ),
                });
            }
            scaling
        }
        None => {
            warnings.push(ConfigWarning {
                level: LogLevel::Error,
                message: format!(
                    "Error: 'scaling' value in config.yaml is not a number. Using default scaling ({}).",
                    FALLBACK_SCALING
                ),
            });
            FALLBACK_SCALING
        }
    }
}

impl ConfigFile {
    fn into_config(self) -> Result<LoadedConfig> {
        let mut warnings = Vec::new();
        let defaults = AppConfig::default();

        let facility_id = self
            .facility_id
            .as_ref()
            .and_then(value_to_text)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow::anyhow!("config.yaml is missing 'facility_id'"))?;

        let scaling = validate_scaling(self.scaling.as_ref(), &mut warnings);

        let non_veg_surcharge = self
            .non_veg_surcharge
            .as_ref()
            .and_then(value_to_text)
            .unwrap_or(defaults.non_veg_surcharge);

        if self.batch_suffix_width == 0 {
            anyhow::bail!("'batch_suffix_width' must be at least 1");
        }

        Ok(LoadedConfig {
            config: AppConfig {
                facility_id,
                scaling,
                file_label: self.file_label,
                mirror_directory: self.mirror_directory,
                non_veg_surcharge,
                batch_prefixes: self.batch_prefixes.iter().map(|p| p.trim().to_uppercase()).collect(),
                batch_suffix_width: self.batch_suffix_width,
                share_recipients: self.share_recipients,
                sources: self.sources,
            },
            warnings,
        })
    }
}

/// File-based configuration repository
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    connection: CsvConnection,
}

impl ConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Load config from file, creating the default if it doesn't exist
    pub fn load_or_create(&self) -> Result<LoadedConfig> {
        let config_path = self.connection.config_path();

        if !config_path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            info!("Created default config at {:?}", config_path);
            return Ok(LoadedConfig {
                config,
                warnings: Vec::new(),
            });
        }

        let yaml_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        let loaded = file.into_config()?;

        for warning in &loaded.warnings {
            warn!("{}", warning.message);
        }
        info!("Loaded config for facility {}", loaded.config.facility_id);
        Ok(loaded)
    }

    /// Save config to file
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let config_path = self.connection.config_path();
        let yaml_content = serde_yaml::to_string(config)?;

        // Atomic write using temp file
        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(yaml: Option<&str>) -> Result<(ConfigRepository, TempDir)> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        if let Some(yaml) = yaml {
            fs::write(connection.config_path(), yaml)?;
        }
        Ok((ConfigRepository::new(connection), temp_dir))
    }

    #[test]
    fn test_creates_default_config() -> Result<()> {
        let (repo, temp_dir) = setup(None)?;
        let loaded = repo.load_or_create()?;

        assert_eq!(loaded.config, AppConfig::default());
        assert!(temp_dir.path().join("config.yaml").exists());

        // The written default loads back unchanged
        let reloaded = repo.load_or_create()?;
        assert_eq!(reloaded.config, AppConfig::default());
        assert!(reloaded.warnings.is_empty());
        Ok(())
    }

    #[test]
    fn test_numeric_facility_and_surcharge() -> Result<()> {
        let (repo, _temp_dir) = setup(Some("facility_id: 7\nnon_veg_surcharge: 25\n"))?;
        let loaded = repo.load_or_create()?;
        assert_eq!(loaded.config.facility_id, "7");
        assert_eq!(loaded.config.non_veg_surcharge, "25");
        assert_eq!(loaded.config.scaling, DEFAULT_SCALING);
        Ok(())
    }

    #[test]
    fn test_missing_facility_is_error() -> Result<()> {
        let (repo, _temp_dir) = setup(Some("scaling: 1.0\n"))?;
        assert!(repo.load_or_create().is_err());
        Ok(())
    }

    #[test]
    fn test_scaling_out_of_range_is_kept_with_warning() -> Result<()> {
        let (repo, _temp_dir) = setup(Some("facility_id: \"5\"\nscaling: 4.5\n"))?;
        let loaded = repo.load_or_create()?;
        assert_eq!(loaded.config.scaling, 4.5);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].level, LogLevel::Warning);
        Ok(())
    }

    #[test]
    fn test_non_numeric_scaling_falls_back() -> Result<()> {
        let (repo, _temp_dir) = setup(Some("facility_id: \"5\"\nscaling: large\n"))?;
        let loaded = repo.load_or_create()?;
        assert_eq!(loaded.config.scaling, FALLBACK_SCALING);
        assert_eq!(loaded.warnings[0].level, LogLevel::Error);
        Ok(())
    }

    #[test]
    fn test_batch_prefixes_are_normalised() -> Result<()> {
        let (repo, _temp_dir) = setup(Some("facility_id: A\nbatch_prefixes: [ms26, ' MS25 ']\n"))?;
        let loaded = repo.load_or_create()?;
        assert_eq!(loaded.config.batch_prefixes, vec!["MS26", "MS25"]);
        Ok(())
    }
}
