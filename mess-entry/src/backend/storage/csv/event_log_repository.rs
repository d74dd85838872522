//! # Event Log Repository
//!
//! Day-scoped, append-only log of every status message shown to the operator,
//! stored as a JSON array in `Logs/<day id>.json`:
//!
//! ```json
//! [
//!   { "time": "07:42:10", "message": "MS25001: Asha is checked.", "level": "info" }
//! ]
//! ```

use anyhow::Result;
use log::debug;
use shared::LogEntry;
use std::fs;

use super::connection::CsvConnection;

#[derive(Debug, Clone)]
pub struct EventLogRepository {
    connection: CsvConnection,
}

impl EventLogRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Start an empty log for the day, discarding any previous entries
    pub fn reset(&self, day_id: &str) -> Result<()> {
        self.write_entries(day_id, &[])
    }

    /// Append one entry, creating the log if needed
    pub fn append(&self, day_id: &str, entry: &LogEntry) -> Result<()> {
        let mut entries = self.read(day_id)?;
        entries.push(entry.clone());
        self.write_entries(day_id, &entries)?;
        debug!("Appended event log entry for {}: {}", day_id, entry.message);
        Ok(())
    }

    /// All entries of the day's log; a missing log reads as empty
    pub fn read(&self, day_id: &str) -> Result<Vec<LogEntry>> {
        let path = self.connection.event_log_path(day_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(&self, day_id: &str, entries: &[LogEntry]) -> Result<()> {
        let path = self.connection.event_log_path(day_id)?;
        let content = serde_json::to_string_pretty(entries)?;

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::LogLevel;
    use tempfile::TempDir;

    fn entry(message: &str, level: LogLevel) -> LogEntry {
        LogEntry {
            time: "19:05:00".to_string(),
            message: message.to_string(),
            level,
        }
    }

    #[test]
    fn test_append_and_read() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let repo = EventLogRepository::new(CsvConnection::new(temp_dir.path())?);

        assert!(repo.read("day")?.is_empty());
        repo.append("day", &entry("Updating Leave Data", LogLevel::Info))?;
        repo.append("day", &entry("Subscriber Data File not found!", LogLevel::Error))?;

        let entries = repo.read("day")?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].level, LogLevel::Error);
        Ok(())
    }

    #[test]
    fn test_reset_discards_entries() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let repo = EventLogRepository::new(CsvConnection::new(temp_dir.path())?);

        repo.append("day", &entry("old", LogLevel::Info))?;
        repo.reset("day")?;
        assert!(repo.read("day")?.is_empty());
        Ok(())
    }
}
