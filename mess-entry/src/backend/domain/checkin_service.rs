//! Check-in engine.
//!
//! Per (registration number, meal) the roster status moves
//! `Unset -> {NotSubscribed, OnLeave, Consumed}` and `Consumed` is terminal.
//! A check-in is validated against the local roster, then against the mirror
//! to catch a subscriber already served at another station, and only then
//! written: local first, mirror second. The local workbook is authoritative;
//! mirror failures are reported as warnings and never undo the local write.
//!
//! The mirror re-read is best-effort. Two stations can still both pass it
//! between one station's read and its write.

use log::{info, warn};
use shared::{Highlight, Meal, RegistrationInput, SubscriberCard};

use crate::backend::domain::commands::checkin::{CheckInCommand, CheckInOutcome};
use crate::backend::domain::commands::coupon::CouponCommand;
use crate::backend::domain::coupon_service::CouponService;
use crate::backend::domain::errors::{EntryError, EntryResult, Rejection};
use crate::backend::domain::models::layout::{REGISTRATION_COLUMN, ROSTER_SHEET};
use crate::backend::domain::models::meal::{meal_columns, MealStatus, Variant};
use crate::backend::domain::models::roster::RosterEntry;
use crate::backend::domain::models::subscriber::normalize_registration;
use crate::backend::storage::{StoreResult, TabularStore};

#[derive(Debug, Clone)]
pub struct CheckInService {
    batch_prefixes: Vec<String>,
    batch_suffix_width: usize,
    coupon_service: CouponService,
}

/// Sheet row holding `registration_number`, header excluded
fn find_row<S: TabularStore>(store: &S, registration_number: &str) -> StoreResult<Option<usize>> {
    let column = store.column(ROSTER_SHEET, REGISTRATION_COLUMN)?;
    Ok(column
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, cell)| normalize_registration(cell) == registration_number)
        .map(|(row, _)| row))
}

/// Subscriber card for an entry, highlighted by the status of `meal`
pub fn subscriber_card(entry: &RosterEntry, meal: Meal) -> SubscriberCard {
    let meals = entry.subscribed_meals();
    let meal_list = meals
        .iter()
        .map(|meal| meal.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let highlight = match entry.status(meal) {
        MealStatus::Consumed(_) => Highlight::AlreadyEaten,
        MealStatus::Leave => Highlight::Leave,
        MealStatus::NotSubscribed => Highlight::NotSubscribed,
        MealStatus::Unset => Highlight::Meals(meal_list.clone()),
    };

    SubscriberCard {
        name: entry.student_name.clone(),
        registration_number: entry.registration_number.clone(),
        meals_subscribed: meals.len(),
        meal_list,
        highlight,
    }
}

impl CheckInService {
    pub fn new(batch_prefixes: Vec<String>, batch_suffix_width: usize) -> Self {
        Self {
            batch_prefixes,
            batch_suffix_width,
            coupon_service: CouponService::new(),
        }
    }

    /// Turn operator input into a normalised registration number.
    /// Batch input is the prefix followed by the digits left-padded with zeros.
    pub fn resolve_registration(&self, input: &RegistrationInput) -> EntryResult<String> {
        match input {
            RegistrationInput::Batch { prefix, digits } => {
                let prefix = normalize_registration(prefix);
                if !self.batch_prefixes.contains(&prefix) {
                    return Err(Rejection::UnknownBatch(prefix).into());
                }
                let digits = digits.trim();
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(EntryError::Invalid(format!(
                        "'{}' is not a valid number for batch {}",
                        digits, prefix
                    )));
                }
                Ok(format!("{}{:0>width$}", prefix, digits, width = self.batch_suffix_width))
            }
            RegistrationInput::Other(raw) => {
                let registration_number = normalize_registration(raw);
                if registration_number.is_empty() {
                    return Err(EntryError::Invalid("Enter a registration number".to_string()));
                }
                Ok(registration_number)
            }
        }
    }

    /// Validate and commit a check-in.
    ///
    /// The algorithm:
    /// 1. Find the subscriber in the local roster; unknown numbers are rejected
    /// 2. Reject unless the meal's local status is unset
    /// 3. Re-read the mirror cell; a consumed value there means another station served them
    /// 4. Write variant and time locally, then to the mirror
    /// 5. Record the surcharge coupon for non-veg, then save the workbook
    pub fn check_in<L, R>(
        &self,
        local: &mut L,
        mut remote: Option<&mut R>,
        command: &CheckInCommand,
        time: &str,
    ) -> EntryResult<CheckInOutcome>
    where
        L: TabularStore,
        R: TabularStore,
    {
        let registration_number = &command.registration_number;
        let meal = command.meal;
        let columns = meal_columns(meal);
        let mut warnings = Vec::new();

        // 1. Roster lookup
        let Some(row) = find_row(local, registration_number)? else {
            return Err(Rejection::NotSubscribed(registration_number.clone()).into());
        };
        let entry = RosterEntry::from_row(&local.row(ROSTER_SHEET, row)?);

        // 2. Local status
        let card = subscriber_card(&entry, meal);
        match entry.status(meal) {
            MealStatus::Consumed(_) => return Err(Rejection::AlreadyChecked(Box::new(card)).into()),
            MealStatus::Leave => return Err(Rejection::OnLeave(Box::new(card)).into()),
            MealStatus::NotSubscribed => {
                return Err(Rejection::NotSubscribedForMeal {
                    card: Box::new(card),
                    meal,
                }
                .into())
            }
            MealStatus::Unset => {}
        }

        // 3. Mirror re-read
        let mut remote_row = None;
        if let Some(document) = remote.as_deref_mut() {
            match Self::remote_status(document, registration_number, meal) {
                Ok(Some((mirror_row, status))) => {
                    if status.is_consumed() {
                        let mut card = card;
                        card.highlight = Highlight::AlreadyEaten;
                        return Err(Rejection::CheckedElsewhere(Box::new(card)).into());
                    }
                    remote_row = Some(mirror_row);
                }
                Ok(None) => {
                    warnings.push(format!("{} is missing from the online sheet", registration_number));
                }
                Err(e) => {
                    warn!("Could not read online status for {}: {}", registration_number, e);
                    warnings.push(format!("Online sheet not checked: {}", e));
                }
            }
        }

        // 4. Commit locally and save before touching the mirror
        let status = MealStatus::Consumed(command.variant);
        let previous_time = local.cell(ROSTER_SHEET, row, columns.time)?;
        local.set_cell(ROSTER_SHEET, row, columns.status, status.as_cell())?;
        local.set_cell(ROSTER_SHEET, row, columns.time, time)?;
        if let Err(e) = local.flush() {
            let restored = local
                .set_cell(ROSTER_SHEET, row, columns.status, entry.status(meal).as_cell())
                .and_then(|_| local.set_cell(ROSTER_SHEET, row, columns.time, &previous_time));
            if let Err(restore_error) = restored {
                warn!("Could not undo check-in of {}: {}", registration_number, restore_error);
            }
            return Err(e.into());
        }

        let mut mirrored = false;
        if let (Some(document), Some(mirror_row)) = (remote.as_deref_mut(), remote_row) {
            let written = document
                .set_cell(ROSTER_SHEET, mirror_row, columns.status, status.as_cell())
                .and_then(|_| document.set_cell(ROSTER_SHEET, mirror_row, columns.time, time));
            match written {
                Ok(()) => mirrored = true,
                Err(e) => {
                    warn!("Online check-in write failed for {}: {}", registration_number, e);
                    warnings.push(format!("Online sheet not updated: {}", e));
                }
            }
        }

        // 5. Surcharge coupon
        let coupon = if command.variant == Variant::NonVeg {
            let coupon_command = CouponCommand {
                identifier: registration_number.clone(),
                price: command.surcharge.clone(),
                meal,
            };
            let outcome = self.coupon_service.record(local, remote, &coupon_command, time)?;
            warnings.extend(outcome.warnings.iter().cloned());
            Some(outcome)
        } else {
            None
        };

        info!(
            "Checked in {} for {} ({}) at {}",
            registration_number,
            meal,
            command.variant.as_str(),
            time
        );

        let mut card = card;
        card.highlight = Highlight::Meals(card.meal_list.clone());
        Ok(CheckInOutcome {
            card,
            meal,
            variant: command.variant,
            time: time.to_string(),
            coupon,
            mirrored,
            warnings,
        })
    }

    /// Row and status of the subscriber's meal in the mirror
    fn remote_status<R: TabularStore>(
        document: &R,
        registration_number: &str,
        meal: Meal,
    ) -> StoreResult<Option<(usize, MealStatus)>> {
        let Some(row) = find_row(document, registration_number)? else {
            return Ok(None);
        };
        let cell = document.cell(ROSTER_SHEET, row, meal_columns(meal).status)?;
        Ok(Some((row, MealStatus::from_cell(&cell))))
    }
}
