//! mess-entry/src/backend/domain/models/subscriber.rs

use shared::Meal;

/// A subscriber of the prepaid meal plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub name: String,
    /// Always upper-cased and trimmed
    pub registration_number: String,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

impl Subscriber {
    /// Build a subscriber from form values; `meals_opted` is a comma-separated
    /// list such as `"Breakfast, Dinner"`
    pub fn new(name: &str, registration_number: &str, meals_opted: &str) -> Self {
        let opted: Vec<Meal> = meals_opted
            .split(',')
            .filter_map(|meal| meal.trim().parse::<Meal>().ok())
            .collect();

        Self {
            name: name.trim().to_string(),
            registration_number: normalize_registration(registration_number),
            breakfast: opted.contains(&Meal::Breakfast),
            lunch: opted.contains(&Meal::Lunch),
            dinner: opted.contains(&Meal::Dinner),
        }
    }

    pub fn opts_for(&self, meal: Meal) -> bool {
        match meal {
            Meal::Breakfast => self.breakfast,
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
        }
    }

    pub fn subscribed_meals(&self) -> Vec<Meal> {
        Meal::ALL.into_iter().filter(|meal| self.opts_for(*meal)).collect()
    }
}

/// Registration numbers are compared and stored upper-cased and trimmed
pub fn normalize_registration(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Form submissions record an institute email; the registration number is the local part
pub fn registration_from_email(raw: &str) -> String {
    let local = raw.split('@').next().unwrap_or_default();
    normalize_registration(local)
}
