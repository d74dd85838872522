//! Operator status reporting.
//!
//! Every status shown to the operator becomes a `LogEntry` in the day's event
//! log and a line in the diagnostic log. Error entries are also appended to the
//! mirror's log sheet when the mirror is reachable.

use anyhow::Result;
use log::{error, info, warn};
use shared::{LogEntry, LogLevel};

use crate::backend::domain::models::layout::{header_row, LOG_HEADER, LOG_SHEET};
use crate::backend::storage::csv::EventLogRepository;
use crate::backend::storage::TabularStore;

#[derive(Debug, Clone)]
pub struct StatusService {
    event_log: EventLogRepository,
}

impl StatusService {
    pub fn new(event_log: EventLogRepository) -> Self {
        Self { event_log }
    }

    /// Record a status message. Failing to write the event log never fails the caller.
    pub fn record(&self, day_id: &str, time: &str, message: &str, level: LogLevel) -> LogEntry {
        match level {
            LogLevel::Info => info!("{}", message),
            LogLevel::Warning => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        }

        let entry = LogEntry {
            time: time.to_string(),
            message: message.to_string(),
            level,
        };
        if let Err(e) = self.event_log.append(day_id, &entry) {
            warn!("Could not write event log for {}: {}", day_id, e);
        }
        entry
    }

    /// Start the day's event log afresh
    pub fn reset(&self, day_id: &str) -> Result<()> {
        self.event_log.reset(day_id)
    }

    pub fn entries(&self, day_id: &str) -> Result<Vec<LogEntry>> {
        self.event_log.read(day_id)
    }

    /// Copy an error entry to the mirror's log sheet; other levels are ignored
    pub fn mirror_entry<D: TabularStore>(&self, document: &mut D, entry: &LogEntry) {
        if entry.level != LogLevel::Error {
            return;
        }
        let appended = document.add_sheet(LOG_SHEET).and_then(|_| {
            if document.row_count(LOG_SHEET)? == 0 {
                document.append_row(LOG_SHEET, &header_row(&LOG_HEADER))?;
            }
            document.append_row(LOG_SHEET, &[entry.time.clone(), entry.message.clone()])
        });
        if let Err(e) = appended {
            warn!("Could not copy error to the online log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::storage::mirror::memory::MemoryMirror;
    use crate::backend::storage::MirrorService;

    #[test]
    fn test_record_appends_to_event_log() -> Result<()> {
        let env = TestEnvironment::new()?;
        let service = StatusService::new(EventLogRepository::new(env.connection.clone()));

        let entry = service.record("day", "07:30:00", "MS25001: Asha is checked.", LogLevel::Info);
        assert_eq!(entry.level, LogLevel::Info);
        service.record("day", "07:31:00", "Subscriber Data File not found!", LogLevel::Error);

        let entries = service.entries("day")?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], entry);

        service.reset("day")?;
        assert!(service.entries("day")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_only_errors_reach_the_mirror() -> Result<()> {
        let env = TestEnvironment::new()?;
        let service = StatusService::new(EventLogRepository::new(env.connection.clone()));
        let mirror = MemoryMirror::new();
        mirror.insert_sheet("day", LOG_SHEET, Vec::new());
        let mut document = mirror.open("day")?;

        let info = service.record("day", "12:00:00", "Coupon Generated for Ravi.", LogLevel::Info);
        let error = service.record("day", "12:01:00", "Disk full", LogLevel::Error);
        service.mirror_entry(&mut document, &info);
        service.mirror_entry(&mut document, &error);

        let rows = mirror.sheet("day", LOG_SHEET).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["12:01:00".to_string(), "Disk full".to_string()]);

        // Offline copies are dropped without failing
        mirror.set_online(false);
        service.mirror_entry(&mut document, &error);
        Ok(())
    }
}
