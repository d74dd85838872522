//! # Domain Module
//!
//! Contains the business logic of the data-entry station: building the day's
//! roster, overlaying leave, checking subscribers in, selling coupons and
//! summarising the day.
//!
//! Services work against the [`TabularStore`](crate::backend::storage::TabularStore)
//! capability set and never care whether a sheet lives in the local workbook
//! or in the mirror.
//!
//! ## Module Organization
//!
//! - **roster_service**: roster construction and the initial workbook layout
//! - **leave_service**: leave parsing, refresh of the current-leave sheet, overlay
//! - **checkin_service**: the check-in state machine
//! - **coupon_service**: the per-meal coupon ledger
//! - **summary_service**: per-meal counts and the calculations report
//! - **subscriber_service**: subscriber aggregation from the form spreadsheets
//! - **day_service**: mirror document publication and the day report
//! - **status_service**: event log and operator status messages
//!
//! ## Business Rules
//!
//! - Registration numbers are upper-cased and trimmed before any comparison
//! - A meal status only moves forward from unset, and a consumed meal stays consumed
//! - Leave never overwrites "NOT"
//! - The local workbook is authoritative; the mirror is best-effort

pub mod checkin_service;
pub mod clock;
pub mod commands;
pub mod coupon_service;
pub mod day_service;
pub mod errors;
pub mod leave_service;
pub mod models;
pub mod roster_service;
pub mod status_service;
pub mod subscriber_service;
pub mod summary_service;

pub use checkin_service::CheckInService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use coupon_service::CouponService;
pub use day_service::DayService;
pub use errors::{EntryError, EntryResult, Rejection};
pub use leave_service::LeaveService;
pub use roster_service::RosterService;
pub use status_service::StatusService;
pub use subscriber_service::SubscriberService;
pub use summary_service::SummaryService;
