//! mess-entry/src/backend/domain/models/leave.rs

use chrono::NaiveDate;

use super::subscriber::registration_from_email;
use crate::backend::storage::csv::config_repository::LeaveColumns;

/// Dates in the leave form responses are written month/day/year
pub const LEAVE_DATE_FORMAT: &str = "%m/%d/%Y";

/// A leave request covering an inclusive date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRecord {
    pub registration_number: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LeaveRecord {
    /// Parse one form response row; `None` when the registration is blank or a date is malformed
    pub fn from_row(row: &[String], columns: &LeaveColumns) -> Option<Self> {
        let cell = |col: usize| row.get(col).map(|c| c.trim()).unwrap_or_default();

        let registration_number = registration_from_email(cell(columns.registration));
        if registration_number.is_empty() {
            return None;
        }
        let start = NaiveDate::parse_from_str(cell(columns.start_date), LEAVE_DATE_FORMAT).ok()?;
        let end = NaiveDate::parse_from_str(cell(columns.end_date), LEAVE_DATE_FORMAT).ok()?;

        Some(Self {
            registration_number,
            start,
            end,
        })
    }

    /// Whether `day` lies inside the leave window, both ends included
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_form_row() {
        let columns = LeaveColumns::default();
        let record = LeaveRecord::from_row(
            &row(&["10/14/2026 18:02:11", "x", "Asha", "ms25001@iisermohali.ac.in", "home", "10/16/2026", "10/18/2026"]),
            &columns,
        )
        .unwrap();

        assert_eq!(record.registration_number, "MS25001");
        assert_eq!(record.start, date(2026, 10, 16));
        assert_eq!(record.end, date(2026, 10, 18));
    }

    #[test]
    fn test_malformed_dates_are_skipped() {
        let columns = LeaveColumns::default();
        assert!(LeaveRecord::from_row(&row(&["", "", "", "MS25001", "", "16-10-2026", "10/18/2026"]), &columns).is_none());
        assert!(LeaveRecord::from_row(&row(&["", "", "", "MS25001", "", "10/16/2026"]), &columns).is_none());
        assert!(LeaveRecord::from_row(&row(&["", "", "", " ", "", "10/16/2026", "10/18/2026"]), &columns).is_none());
    }

    #[test]
    fn test_window_is_inclusive() {
        let record = LeaveRecord {
            registration_number: "MS25001".to_string(),
            start: date(2026, 10, 16),
            end: date(2026, 10, 18),
        };
        assert!(!record.is_active_on(date(2026, 10, 15)));
        assert!(record.is_active_on(date(2026, 10, 16)));
        assert!(record.is_active_on(date(2026, 10, 18)));
        assert!(!record.is_active_on(date(2026, 10, 19)));
    }
}
