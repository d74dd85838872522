//! Leave handling.
//!
//! The leave source is a form-responses sheet with one row per request. A
//! refresh copies the requests active on the planning day into the "current
//! leave" sheet; day creation reads that sheet back and overlays it on the
//! roster.

use chrono::NaiveDate;
use log::{debug, info};
use shared::{Meal, MealCounts};

use crate::backend::domain::models::leave::LeaveRecord;
use crate::backend::domain::models::meal::MealStatus;
use crate::backend::domain::models::roster::Roster;
use crate::backend::storage::csv::config_repository::SourceConfig;
use crate::backend::storage::{StoreResult, TabularStore};

#[derive(Debug, Clone)]
pub struct LeaveService {
    sources: SourceConfig,
}

impl LeaveService {
    pub fn new(sources: SourceConfig) -> Self {
        Self { sources }
    }

    /// Parse leave rows after the header, skipping rows that do not parse
    pub fn parse_leave_rows(&self, rows: &[Vec<String>]) -> Vec<LeaveRecord> {
        rows.iter()
            .skip(1)
            .filter_map(|row| {
                let record = LeaveRecord::from_row(row, &self.sources.leave_columns);
                if record.is_none() {
                    debug!("Skipping malformed leave row: {:?}", row);
                }
                record
            })
            .collect()
    }

    /// Overlay leave records active on `day` onto the roster.
    ///
    /// Only unset meals become "LEAVE"; "NOT" and anything already marked is
    /// left alone, so a subscriber with two overlapping requests counts once.
    /// Records for registration numbers missing from the roster are skipped.
    pub fn merge_leaves(&self, roster: &mut Roster, leaves: &[LeaveRecord], day: NaiveDate) -> MealCounts {
        let mut counts = MealCounts::default();

        for leave in leaves.iter().filter(|leave| leave.is_active_on(day)) {
            let Some(entry) = roster.find_mut(&leave.registration_number) else {
                debug!("Leave for {} does not match any subscriber", leave.registration_number);
                continue;
            };
            for meal in Meal::ALL {
                let slot = entry.slot_mut(meal);
                if slot.status == MealStatus::Unset {
                    slot.status = MealStatus::Leave;
                    counts.increment(meal);
                }
            }
        }

        info!(
            "Merged leaves for {}: breakfast {}, lunch {}, dinner {}",
            day, counts.breakfast, counts.lunch, counts.dinner
        );
        counts
    }

    /// Replace the current-leave sheet with the form responses active on `day`.
    /// Returns the number of active requests.
    pub fn refresh_current_leaves<D: TabularStore>(&self, document: &mut D, day: NaiveDate) -> StoreResult<usize> {
        let responses = document.rows(&self.sources.leave_responses_sheet)?;
        let header = responses.first().cloned().unwrap_or_default();

        let mut current = vec![header];
        for row in responses.iter().skip(1) {
            let active = LeaveRecord::from_row(row, &self.sources.leave_columns)
                .map(|record| record.is_active_on(day))
                .unwrap_or(false);
            if active {
                current.push(row.clone());
            }
        }

        let active_count = current.len() - 1;
        document.add_sheet(&self.sources.current_leave_sheet)?;
        document.replace_rows(&self.sources.current_leave_sheet, &current)?;
        info!("Refreshed current leaves for {}: {} active", day, active_count);
        Ok(active_count)
    }

    /// Leave records from the current-leave sheet
    pub fn read_current_leaves<D: TabularStore>(&self, document: &D) -> StoreResult<Vec<LeaveRecord>> {
        let rows = document.rows(&self.sources.current_leave_sheet)?;
        Ok(self.parse_leave_rows(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::subscriber::Subscriber;
    use crate::backend::domain::roster_service::RosterService;
    use crate::backend::storage::mirror::memory::MemoryMirror;
    use crate::backend::storage::MirrorService;
    use anyhow::Result;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leave(registration: &str, start: NaiveDate, end: NaiveDate) -> LeaveRecord {
        LeaveRecord {
            registration_number: registration.to_string(),
            start,
            end,
        }
    }

    fn response(registration: &str, start: &str, end: &str) -> Vec<String> {
        ["10/14/2026 20:00:00", "", "", registration, "", start, end]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    fn service() -> LeaveService {
        LeaveService::new(SourceConfig::default())
    }

    #[test]
    fn test_leave_never_overwrites_not_subscribed() {
        let roster_service = RosterService::new();
        let mut roster = roster_service.build_roster(&[
            Subscriber::new("A", "MS25001", "Lunch, Dinner"),
            Subscriber::new("B", "MS25002", "Breakfast, Lunch, Dinner"),
            Subscriber::new("C", "MS25003", "Breakfast, Lunch, Dinner"),
        ]);
        let tomorrow = date(2026, 10, 17);

        let counts = service().merge_leaves(
            &mut roster,
            &[leave("MS25001", date(2026, 10, 16), date(2026, 10, 20))],
            tomorrow,
        );

        let a = roster.find("MS25001").unwrap();
        assert_eq!(a.status(Meal::Breakfast), MealStatus::NotSubscribed);
        assert_eq!(a.status(Meal::Lunch), MealStatus::Leave);
        assert_eq!(a.status(Meal::Dinner), MealStatus::Leave);
        assert_eq!(
            counts,
            MealCounts {
                breakfast: 0,
                lunch: 1,
                dinner: 1
            }
        );
        assert_eq!(roster.find("MS25002").unwrap().status(Meal::Lunch), MealStatus::Unset);
    }

    #[test]
    fn test_inactive_unknown_and_duplicate_leaves() {
        let mut roster = RosterService::new().build_roster(&[Subscriber::new("B", "MS25002", "Lunch")]);
        let day = date(2026, 10, 17);

        let counts = service().merge_leaves(
            &mut roster,
            &[
                leave("MS25002", date(2026, 10, 18), date(2026, 10, 19)),
                leave("MS99999", day, day),
                leave("MS25002", day, day),
                leave("ms25002", date(2026, 10, 1), day),
            ],
            day,
        );

        assert_eq!(counts.lunch, 1);
        assert_eq!(counts.breakfast, 0);
    }

    #[test]
    fn test_empty_leave_source() {
        assert!(service().parse_leave_rows(&[]).is_empty());
        let header_only = vec![vec!["Timestamp".to_string()]];
        assert!(service().parse_leave_rows(&header_only).is_empty());
    }

    #[test]
    fn test_refresh_keeps_active_rows_only() -> Result<()> {
        let mirror = MemoryMirror::new();
        let sources = SourceConfig::default();
        mirror.insert_sheet(
            &sources.leave_document,
            &sources.leave_responses_sheet,
            vec![
                vec!["Timestamp".to_string(), "Registration".to_string()],
                response("ms25001@iisermohali.ac.in", "10/16/2026", "10/18/2026"),
                response("ms25002@iisermohali.ac.in", "10/01/2026", "10/02/2026"),
                response("ms25003@iisermohali.ac.in", "tomorrow", "10/18/2026"),
            ],
        );

        let service = service();
        let mut document = mirror.open(&sources.leave_document)?;
        let active = service.refresh_current_leaves(&mut document, date(2026, 10, 17))?;
        assert_eq!(active, 1);

        let current = service.read_current_leaves(&document)?;
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].registration_number, "MS25001");
        Ok(())
    }
}
