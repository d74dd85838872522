//! Source of the current local time, so meal selection and leave windows can be pinned in tests.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use shared::Meal;

/// Check-in and coupon times are written as hour:minute:second
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Day the leave list is planned for; entry files are made the evening before
    fn planning_day(&self) -> NaiveDate {
        self.today() + Duration::days(1)
    }

    fn time_of_day(&self) -> String {
        self.now().format(TIME_FORMAT).to_string()
    }

    /// Meal being served at this hour
    fn current_meal(&self) -> Meal {
        Meal::for_hour(self.now().hour())
    }
}

/// Wall clock in the station's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn at(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Self {
        Self(date.and_hms_opt(hour, minute, second).unwrap_or_else(|| date.and_time(Default::default())))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_derivations() {
        let clock = FixedClock::at(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 12, 5, 9);
        assert_eq!(clock.time_of_day(), "12:05:09");
        assert_eq!(clock.current_meal(), Meal::Lunch);
        assert_eq!(clock.planning_day(), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }
}
