use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three services the mess runs each day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    /// All meals in serving order
    pub const ALL: [Meal; 3] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Breakfast => "Breakfast",
            Meal::Lunch => "Lunch",
            Meal::Dinner => "Dinner",
        }
    }

    /// Meal being served at the given hour of the day.
    ///
    /// Before 11:00 is breakfast, 11:00 through 17:59 is lunch, anything later is dinner.
    pub fn for_hour(hour: u32) -> Meal {
        if hour < 11 {
            Meal::Breakfast
        } else if hour <= 17 {
            Meal::Lunch
        } else {
            Meal::Dinner
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a meal name cannot be parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ParseMealError(pub String);

impl fmt::Display for ParseMealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown meal '{}', expected Breakfast, Lunch or Dinner", self.0)
    }
}

impl std::error::Error for ParseMealError {}

impl FromStr for Meal {
    type Err = ParseMealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" | "b" => Ok(Meal::Breakfast),
            "lunch" | "l" => Ok(Meal::Lunch),
            "dinner" | "d" => Ok(Meal::Dinner),
            _ => Err(ParseMealError(s.to_string())),
        }
    }
}

/// Severity of an operator-facing status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// One entry of the day-scoped event log, also the payload of every status update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Time of day (HH:MM:SS)
    pub time: String,
    pub message: String,
    pub level: LogLevel,
}

/// How the operator typed the registration number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegistrationInput {
    /// Batch prefix plus the numeric part, e.g. `MS25` + `7` -> `MS25007`
    Batch { prefix: String, digits: String },
    /// A full registration number typed as-is
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub registration: RegistrationInput,
    /// Meal to check in for; derived from the time of day when absent
    pub meal: Option<Meal>,
    pub non_veg: bool,
    /// Free-text surcharge for a non-veg check-in; the configured value when absent
    pub surcharge: Option<String>,
}

/// Colour category shown next to a checked-in subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Highlight {
    AlreadyEaten,
    Leave,
    NotSubscribed,
    /// Combination of subscribed meals, e.g. "Breakfast, Dinner"
    Meals(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberCard {
    pub name: String,
    pub registration_number: String,
    pub meals_subscribed: usize,
    pub meal_list: String,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub card: SubscriberCard,
    pub meal: Meal,
    /// "veg" or "non-veg"
    pub variant: String,
    pub time: String,
    /// Supplemental coupon recorded for a non-veg check-in
    pub coupon: Option<CouponResponse>,
    /// False when the mirror could not be updated
    pub mirrored: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponRequest {
    /// Name or registration number of the buyer
    pub identifier: String,
    /// Free-text price; unparsable text is recorded as 0.0
    pub price: String,
    pub meal: Option<Meal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponResponse {
    pub identifier: String,
    pub meal: Meal,
    pub amount: f64,
    pub time: String,
    /// Coupons sold so far for this meal
    pub coupons_sold: usize,
    pub mirrored: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDayRequest {
    pub update_leaves: bool,
    pub update_subscribers: bool,
    pub create_mirror: bool,
}

impl Default for CreateDayRequest {
    fn default() -> Self {
        Self {
            update_leaves: true,
            update_subscribers: true,
            create_mirror: true,
        }
    }
}

/// A count per meal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealCounts {
    pub breakfast: usize,
    pub lunch: usize,
    pub dinner: usize,
}

impl MealCounts {
    pub fn get(&self, meal: Meal) -> usize {
        match meal {
            Meal::Breakfast => self.breakfast,
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
        }
    }

    pub fn increment(&mut self, meal: Meal) {
        match meal {
            Meal::Breakfast => self.breakfast += 1,
            Meal::Lunch => self.lunch += 1,
            Meal::Dinner => self.dinner += 1,
        }
    }
}

/// Whether the day's mirror document was touched while creating the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MirrorState {
    Created,
    Reused,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDayResponse {
    pub day_id: String,
    pub subscribers: MealCounts,
    pub leaves: MealCounts,
    pub mirror: MirrorState,
    /// Formatted subscriber/leave/food-to-prepare report
    pub report: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    pub meal: Meal,
    pub veg: usize,
    pub non_veg: usize,
    pub leave: usize,
    pub not_subscribed: usize,
    pub not_availed: usize,
    pub coupon_count: usize,
    pub coupon_amount: f64,
}

/// Which store the summary was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummarySource {
    Mirror,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummaryResponse {
    pub source: SummarySource,
    pub meals: Vec<MealSummary>,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSubscribersResponse {
    pub subscriber_count: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshLeavesResponse {
    pub active_leaves: usize,
    pub success_message: String,
}
