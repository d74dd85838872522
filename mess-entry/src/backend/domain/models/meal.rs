//! mess-entry/src/backend/domain/models/meal.rs

use shared::Meal;

/// Status cell value for a subscriber who did not opt for the meal
pub const NOT_SUBSCRIBED: &str = "NOT";
/// Status cell value for a subscriber on leave for the meal
pub const LEAVE: &str = "LEAVE";
pub const VEG: &str = "veg";
pub const NON_VEG: &str = "non-veg";

/// Zero-based status and time columns of a meal in the roster sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealColumns {
    pub status: usize,
    pub time: usize,
}

/// Column lookup for the roster layout
/// `Student Name | Registration Number | Breakfast | Breakfast Time | Lunch | Lunch Time | Dinner | Dinner Time`
pub fn meal_columns(meal: Meal) -> MealColumns {
    match meal {
        Meal::Breakfast => MealColumns { status: 2, time: 3 },
        Meal::Lunch => MealColumns { status: 4, time: 5 },
        Meal::Dinner => MealColumns { status: 6, time: 7 },
    }
}

/// Vegetarian or non-vegetarian meal choice at check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Veg,
    NonVeg,
}

impl Variant {
    pub fn from_toggle(non_veg: bool) -> Self {
        if non_veg {
            Variant::NonVeg
        } else {
            Variant::Veg
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Veg => VEG,
            Variant::NonVeg => NON_VEG,
        }
    }
}

/// Per-meal status of a roster entry.
///
/// Transitions only go forward from `Unset`; `Consumed` is terminal for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MealStatus {
    #[default]
    Unset,
    NotSubscribed,
    Leave,
    Consumed(Variant),
}

impl MealStatus {
    /// Interpret a status cell. Text that is none of the known values reads as `Unset`.
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.eq_ignore_ascii_case(NOT_SUBSCRIBED) {
            MealStatus::NotSubscribed
        } else if cell.eq_ignore_ascii_case(LEAVE) {
            MealStatus::Leave
        } else if cell.eq_ignore_ascii_case(VEG) {
            MealStatus::Consumed(Variant::Veg)
        } else if cell.eq_ignore_ascii_case(NON_VEG) {
            MealStatus::Consumed(Variant::NonVeg)
        } else {
            MealStatus::Unset
        }
    }

    pub fn as_cell(&self) -> &'static str {
        match self {
            MealStatus::Unset => "",
            MealStatus::NotSubscribed => NOT_SUBSCRIBED,
            MealStatus::Leave => LEAVE,
            MealStatus::Consumed(variant) => variant.as_str(),
        }
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self, MealStatus::Consumed(_))
    }
}
