//! # CSV Storage Module
//!
//! Local, file-based storage for the data-entry station. Everything lives
//! under one data directory (see [`CsvConnection`]):
//!
//! - one workbook per day, a directory of per-sheet CSV files
//! - the subscriber cache, rebuilt on every subscriber sync
//! - the per-day JSON event log
//! - `config.yaml`
//!
//! All writes go through a temp file and `fs::rename`.

pub mod config_repository;
pub mod connection;
pub mod event_log_repository;
pub mod subscriber_repository;
pub mod workbook;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::{AppConfig, ConfigRepository, LoadedConfig};
pub use connection::CsvConnection;
pub use event_log_repository::EventLogRepository;
pub use subscriber_repository::SubscriberCacheRepository;
pub use workbook::Workbook;
