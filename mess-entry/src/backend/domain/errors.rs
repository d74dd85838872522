//! Operator-facing error taxonomy.
//!
//! Every action failure ends up as one of these, and every one of them is
//! turned into a status message plus an event log entry at the action boundary.

use shared::{LogLevel, Meal, SubscriberCard};
use thiserror::Error;

use crate::backend::storage::error::StoreError;

/// Expected check-in outcomes that stop the transition; no state is mutated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("{0} has not subscribed to any meal.")]
    NotSubscribed(String),

    #[error("{}: {} was already checked. STOP!", .0.registration_number, .0.name)]
    AlreadyChecked(Box<SubscriberCard>),

    #[error("{}: {} is on LEAVE. STOP!", .0.registration_number, .0.name)]
    OnLeave(Box<SubscriberCard>),

    #[error("{}: {} is not subscribed in this meal. STOP!", .card.registration_number, .card.name)]
    NotSubscribedForMeal { card: Box<SubscriberCard>, meal: Meal },

    #[error("{}: {} was checked in other mess. STOP!", .0.registration_number, .0.name)]
    CheckedElsewhere(Box<SubscriberCard>),

    #[error("Unknown batch '{0}'")]
    UnknownBatch(String),
}

impl Rejection {
    /// Card of the subscriber the rejection is about, when the subscriber is known
    pub fn card(&self) -> Option<&SubscriberCard> {
        match self {
            Rejection::AlreadyChecked(card)
            | Rejection::OnLeave(card)
            | Rejection::CheckedElsewhere(card)
            | Rejection::NotSubscribedForMeal { card, .. } => Some(card),
            Rejection::NotSubscribed(_) | Rejection::UnknownBatch(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A file, document or cache the action needs does not exist
    #[error("{0}")]
    NotFound(String),

    #[error("Mirror unreachable: {0}")]
    Connectivity(String),

    /// The request itself cannot be carried out, e.g. the day file already exists
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl EntryError {
    /// Event log level the failure is recorded with
    pub fn level(&self) -> LogLevel {
        match self {
            EntryError::Rejected(_) | EntryError::Invalid(_) => LogLevel::Warning,
            EntryError::Connectivity(_) => LogLevel::Warning,
            EntryError::NotFound(_) | EntryError::Unexpected(_) => LogLevel::Error,
        }
    }
}

impl From<StoreError> for EntryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unreachable(message) => EntryError::Connectivity(message),
            StoreError::DocumentNotFound(_) | StoreError::SheetNotFound(_) => {
                EntryError::NotFound(error.to_string())
            }
            StoreError::AlreadyExists(_) => EntryError::Invalid(error.to_string()),
            other => EntryError::Unexpected(anyhow::Error::new(other)),
        }
    }
}

pub type EntryResult<T> = std::result::Result<T, EntryError>;
