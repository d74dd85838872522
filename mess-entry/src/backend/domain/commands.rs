// mess-entry/src/backend/domain/commands.rs

//! Domain-level command and result types
//! These structs are used by services inside the domain layer and are **not**
//! exposed to operator surfaces. The session (`Backend`) maps the public DTOs
//! defined in the `shared` crate to these internal types.

pub mod checkin {
    use super::coupon::CouponOutcome;
    use crate::backend::domain::models::meal::Variant;
    use shared::{Meal, SubscriberCard};

    /// Input for checking a subscriber in for a meal.
    #[derive(Debug, Clone)]
    pub struct CheckInCommand {
        /// Already normalised
        pub registration_number: String,
        pub meal: Meal,
        pub variant: Variant,
        /// Free-text price of the non-veg supplement
        pub surcharge: String,
    }

    /// Result of a committed check-in.
    #[derive(Debug, Clone)]
    pub struct CheckInOutcome {
        pub card: SubscriberCard,
        pub meal: Meal,
        pub variant: Variant,
        pub time: String,
        /// Supplement recorded for a non-veg check-in
        pub coupon: Option<CouponOutcome>,
        /// Whether the mirror received the status write
        pub mirrored: bool,
        /// Problems with the mirror that did not stop the check-in
        pub warnings: Vec<String>,
    }
}

pub mod coupon {
    use crate::backend::domain::models::coupon::CouponRecord;
    use shared::Meal;

    /// Input for recording a coupon sale.
    #[derive(Debug, Clone)]
    pub struct CouponCommand {
        pub identifier: String,
        /// Free text; unparsable prices are recorded as 0.0
        pub price: String,
        pub meal: Meal,
    }

    /// Result of recording a coupon sale.
    #[derive(Debug, Clone)]
    pub struct CouponOutcome {
        pub record: CouponRecord,
        pub meal: Meal,
        /// Coupons sold for the meal so far, this one included
        pub coupons_sold: usize,
        pub mirrored: bool,
        pub warnings: Vec<String>,
    }
}

pub mod day {
    use shared::{MealCounts, MirrorState};

    /// The day's mirror document after publication
    #[derive(Debug)]
    pub struct MirrorPublication<D> {
        pub document: D,
        pub state: MirrorState,
        /// Recipients the document could not be shared with
        pub warnings: Vec<String>,
    }

    /// Result of building a day's roster.
    #[derive(Debug, Clone, Default)]
    pub struct RosterCounts {
        pub subscribers: MealCounts,
        pub leaves: MealCounts,
    }

    impl RosterCounts {
        /// Meals to cook: subscribers minus those on leave
        pub fn to_prepare(&self) -> MealCounts {
            MealCounts {
                breakfast: self.subscribers.breakfast.saturating_sub(self.leaves.breakfast),
                lunch: self.subscribers.lunch.saturating_sub(self.leaves.lunch),
                dinner: self.subscribers.dinner.saturating_sub(self.leaves.dinner),
            }
        }
    }
}
