//! Shared fixtures for storage and backend tests.
//!
//! Every environment lives in its own temporary data directory that is
//! removed when the environment drops, including on panic.

use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use super::config_repository::AppConfig;
use super::connection::CsvConnection;
use super::subscriber_repository::SubscriberCacheRepository;
use crate::backend::domain::models::subscriber::Subscriber;

/// A station data directory for one test
pub struct TestEnvironment {
    pub connection: CsvConnection,
    /// Data directory root, for tests that open a backend from disk
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    /// Write a raw `config.yaml`
    pub fn write_config(&self, yaml: &str) -> Result<()> {
        fs::write(self.connection.config_path(), yaml)?;
        Ok(())
    }

    /// Default configuration for tests; no mirror directory
    pub fn config(&self) -> AppConfig {
        AppConfig::default()
    }

    /// Populate the subscriber cache as a previous sync would have
    pub fn seed_subscribers(&self, subscribers: &[Subscriber]) -> Result<()> {
        SubscriberCacheRepository::new(self.connection.clone()).store(subscribers)
    }
}
