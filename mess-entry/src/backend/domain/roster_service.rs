//! Roster construction for a new day.
//!
//! Turns the subscriber list into the day's roster and writes the initial
//! workbook: roster sheet, one coupon sheet per meal and an empty
//! calculations sheet.

use log::{debug, info};
use shared::{Meal, MealCounts};
use std::collections::HashSet;
use std::path::Path;

use crate::backend::domain::models::layout::{
    coupon_sheet, header_row, workbook_sheets, COUPON_HEADER, ROSTER_SHEET,
};
use crate::backend::domain::models::meal::MealStatus;
use crate::backend::domain::models::roster::{Roster, RosterEntry};
use crate::backend::domain::models::subscriber::{normalize_registration, Subscriber};
use crate::backend::storage::csv::Workbook;
use crate::backend::storage::{StoreResult, TabularStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct RosterService;

impl RosterService {
    pub fn new() -> Self {
        Self
    }

    /// Build the roster, one entry per distinct registration number in list order.
    /// Meals a subscriber did not opt for are seeded as "NOT".
    pub fn build_roster(&self, subscribers: &[Subscriber]) -> Roster {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(subscribers.len());

        for subscriber in subscribers {
            let registration_number = normalize_registration(&subscriber.registration_number);
            if registration_number.is_empty() {
                debug!("Skipping subscriber '{}' without a registration number", subscriber.name);
                continue;
            }
            if !seen.insert(registration_number.clone()) {
                debug!("Skipping duplicate subscriber {}", registration_number);
                continue;
            }
            entries.push(RosterEntry::from_subscriber(subscriber));
        }

        info!("Built roster with {} entries", entries.len());
        Roster::new(entries)
    }

    /// Number of entries not seeded as "NOT", per meal
    pub fn subscriber_counts(&self, roster: &Roster) -> MealCounts {
        let mut counts = MealCounts::default();
        for entry in &roster.entries {
            for meal in Meal::ALL {
                if entry.status(meal) != MealStatus::NotSubscribed {
                    counts.increment(meal);
                }
            }
        }
        counts
    }

    /// Lay out a fresh, unsaved workbook for the day
    pub fn new_workbook<P: AsRef<Path>>(&self, directory: P, roster: &Roster) -> StoreResult<Workbook> {
        let mut workbook = Workbook::create(directory);
        for sheet in workbook_sheets() {
            workbook.add_sheet(&sheet)?;
        }

        workbook.replace_rows(ROSTER_SHEET, &roster.to_rows())?;
        for meal in Meal::ALL {
            workbook.append_row(&coupon_sheet(meal), &header_row(&COUPON_HEADER))?;
        }
        Ok(workbook)
    }
}
