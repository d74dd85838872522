//! Data-entry station for a student-run dining hall.
//!
//! The [`backend`] module holds the day's roster, check-in, coupon and summary
//! logic on top of a local workbook and an optional online mirror.

pub mod backend;
