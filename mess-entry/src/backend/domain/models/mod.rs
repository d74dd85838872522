pub mod coupon;
pub mod day;
pub mod layout;
pub mod leave;
pub mod meal;
pub mod roster;
pub mod subscriber;
