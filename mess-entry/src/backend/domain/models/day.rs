//! mess-entry/src/backend/domain/models/day.rs

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// From this hour on, the day being prepared is tomorrow
const NEXT_DAY_FROM_HOUR: u32 = 22;

/// Identifier shared by a day's local workbook, mirror document and event log,
/// e.g. `16 October, 2026 SRM Data`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayId {
    date: NaiveDate,
    label: String,
}

impl DayId {
    pub fn new(date: NaiveDate, label: &str) -> Self {
        Self {
            date,
            label: label.trim().to_string(),
        }
    }

    /// Today, or tomorrow once it is late in the evening
    pub fn default_date(now: NaiveDateTime) -> NaiveDate {
        if now.hour() >= NEXT_DAY_FROM_HOUR {
            now.date() + Duration::days(1)
        } else {
            now.date()
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%d %B, %Y"), self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_display() {
        let day = DayId::new(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(), "SRM Data");
        assert_eq!(day.to_string(), "05 March, 2026 SRM Data");
    }

    #[test]
    fn test_default_date_rolls_over_late_evening() {
        assert_eq!(DayId::default_date(at(21)), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(DayId::default_date(at(22)), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }
}
