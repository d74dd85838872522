//! mess-entry/src/backend/domain/models/roster.rs
//!
//! The day's roster: one entry per subscriber with a status and a time per meal.
//! Row 0 of the roster sheet is the header.

use shared::Meal;

use super::layout::{header_row, NAME_COLUMN, REGISTRATION_COLUMN, ROSTER_HEADER};
use super::meal::{meal_columns, MealStatus};
use super::subscriber::{normalize_registration, Subscriber};

/// Status and check-in time of one meal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealSlot {
    pub status: MealStatus,
    /// `HH:MM:SS`, empty until checked in
    pub time: String,
}

impl MealSlot {
    fn with_status(status: MealStatus) -> Self {
        Self {
            status,
            time: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student_name: String,
    pub registration_number: String,
    pub breakfast: MealSlot,
    pub lunch: MealSlot,
    pub dinner: MealSlot,
}

impl RosterEntry {
    /// Seed an entry from a subscriber: "NOT" for meals not opted, unset otherwise
    pub fn from_subscriber(subscriber: &Subscriber) -> Self {
        let seed = |meal: Meal| {
            if subscriber.opts_for(meal) {
                MealSlot::default()
            } else {
                MealSlot::with_status(MealStatus::NotSubscribed)
            }
        };

        Self {
            student_name: subscriber.name.clone(),
            registration_number: normalize_registration(&subscriber.registration_number),
            breakfast: seed(Meal::Breakfast),
            lunch: seed(Meal::Lunch),
            dinner: seed(Meal::Dinner),
        }
    }

    pub fn slot(&self, meal: Meal) -> &MealSlot {
        match meal {
            Meal::Breakfast => &self.breakfast,
            Meal::Lunch => &self.lunch,
            Meal::Dinner => &self.dinner,
        }
    }

    pub fn slot_mut(&mut self, meal: Meal) -> &mut MealSlot {
        match meal {
            Meal::Breakfast => &mut self.breakfast,
            Meal::Lunch => &mut self.lunch,
            Meal::Dinner => &mut self.dinner,
        }
    }

    pub fn status(&self, meal: Meal) -> MealStatus {
        self.slot(meal).status
    }

    /// Meals that were not seeded as "NOT"
    pub fn subscribed_meals(&self) -> Vec<Meal> {
        Meal::ALL
            .into_iter()
            .filter(|meal| self.status(*meal) != MealStatus::NotSubscribed)
            .collect()
    }

    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![String::new(); ROSTER_HEADER.len()];
        row[NAME_COLUMN] = self.student_name.clone();
        row[REGISTRATION_COLUMN] = self.registration_number.clone();
        for meal in Meal::ALL {
            let columns = meal_columns(meal);
            let slot = self.slot(meal);
            row[columns.status] = slot.status.as_cell().to_string();
            row[columns.time] = slot.time.clone();
        }
        row
    }

    pub fn from_row(row: &[String]) -> Self {
        let cell = |col: usize| row.get(col).map(|c| c.trim().to_string()).unwrap_or_default();
        let slot = |meal: Meal| {
            let columns = meal_columns(meal);
            MealSlot {
                status: MealStatus::from_cell(&cell(columns.status)),
                time: cell(columns.time),
            }
        };

        Self {
            student_name: cell(NAME_COLUMN),
            registration_number: normalize_registration(&cell(REGISTRATION_COLUMN)),
            breakfast: slot(Meal::Breakfast),
            lunch: slot(Meal::Lunch),
            dinner: slot(Meal::Dinner),
        }
    }
}

/// A day's roster in sheet order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Parse a roster sheet. Row 0 is the header; fully blank rows are ignored.
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let entries = rows
            .iter()
            .skip(1)
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| RosterEntry::from_row(row))
            .collect();
        Self { entries }
    }

    /// Header row followed by one row per entry
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);
        rows.push(header_row(&ROSTER_HEADER));
        rows.extend(self.entries.iter().map(RosterEntry::to_row));
        rows
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry with the given registration number
    pub fn position(&self, registration_number: &str) -> Option<usize> {
        let wanted = normalize_registration(registration_number);
        self.entries
            .iter()
            .position(|entry| entry.registration_number == wanted)
    }

    pub fn find(&self, registration_number: &str) -> Option<&RosterEntry> {
        self.position(registration_number).map(|index| &self.entries[index])
    }

    pub fn find_mut(&mut self, registration_number: &str) -> Option<&mut RosterEntry> {
        let index = self.position(registration_number)?;
        self.entries.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::meal::Variant;

    #[test]
    fn test_from_subscriber_seeds_not_subscribed() {
        let entry = RosterEntry::from_subscriber(&Subscriber::new("Asha", "ms25001", "Lunch, Dinner"));
        assert_eq!(entry.status(Meal::Breakfast), MealStatus::NotSubscribed);
        assert_eq!(entry.status(Meal::Lunch), MealStatus::Unset);
        assert_eq!(entry.to_row()[2], "NOT");
        assert_eq!(entry.subscribed_meals(), vec![Meal::Lunch, Meal::Dinner]);
    }

    #[test]
    fn test_rows_round_trip_with_checkins() {
        let mut roster = Roster::new(vec![
            RosterEntry::from_subscriber(&Subscriber::new("Asha", "MS25001", "Breakfast, Lunch, Dinner")),
            RosterEntry::from_subscriber(&Subscriber::new("Dev", "MS24017", "Dinner")),
        ]);
        {
            let entry = roster.find_mut("ms25001").unwrap();
            let slot = entry.slot_mut(Meal::Lunch);
            slot.status = MealStatus::Consumed(Variant::NonVeg);
            slot.time = "12:45:03".to_string();
            entry.slot_mut(Meal::Dinner).status = MealStatus::Leave;
        }

        let rows = roster.to_rows();
        assert_eq!(rows[0], header_row(&ROSTER_HEADER));
        assert_eq!(rows[1][4], "non-veg");
        assert_eq!(rows[1][5], "12:45:03");

        assert_eq!(Roster::from_rows(&rows), roster);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let roster = Roster::new(vec![RosterEntry::from_subscriber(&Subscriber::new(
            "Asha", "MS25001", "Lunch",
        ))]);
        assert_eq!(roster.position(" ms25001 "), Some(0));
        assert_eq!(roster.position("MS25002"), None);
    }

    #[test]
    fn test_from_rows_skips_blank_rows() {
        let rows = vec![
            header_row(&ROSTER_HEADER),
            vec![String::new()],
            vec!["Asha".to_string(), "ms25001".to_string()],
        ];
        let roster = Roster::from_rows(&rows);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.entries[0].registration_number, "MS25001");
    }
}
