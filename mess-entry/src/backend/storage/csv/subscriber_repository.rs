//! # Subscriber Cache Repository
//!
//! Local copy of the aggregated subscriber list, rebuilt wholesale on every
//! subscriber sync and read when a day file is created.
//!
//! ```csv
//! Student Name,Registration Number,Breakfast,Lunch,Dinner
//! Asha Rao,MS25001,,NOT,
//! ```
//!
//! A meal column holds `NOT` when the subscriber did not opt for that meal.

use anyhow::Result;
use csv::{Reader, Writer};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;

use super::connection::CsvConnection;
use crate::backend::domain::models::meal::NOT_SUBSCRIBED;
use crate::backend::domain::models::subscriber::{normalize_registration, Subscriber};
use crate::backend::storage::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubscriberRecord {
    #[serde(rename = "Student Name")]
    name: String,
    #[serde(rename = "Registration Number")]
    registration_number: String,
    #[serde(rename = "Breakfast", default)]
    breakfast: String,
    #[serde(rename = "Lunch", default)]
    lunch: String,
    #[serde(rename = "Dinner", default)]
    dinner: String,
}

fn flag(opted: bool) -> String {
    if opted {
        String::new()
    } else {
        NOT_SUBSCRIBED.to_string()
    }
}

impl From<&Subscriber> for SubscriberRecord {
    fn from(subscriber: &Subscriber) -> Self {
        Self {
            name: subscriber.name.clone(),
            registration_number: subscriber.registration_number.clone(),
            breakfast: flag(subscriber.breakfast),
            lunch: flag(subscriber.lunch),
            dinner: flag(subscriber.dinner),
        }
    }
}

impl From<SubscriberRecord> for Subscriber {
    fn from(record: SubscriberRecord) -> Self {
        Self {
            name: record.name,
            registration_number: normalize_registration(&record.registration_number),
            breakfast: record.breakfast.trim() != NOT_SUBSCRIBED,
            lunch: record.lunch.trim() != NOT_SUBSCRIBED,
            dinner: record.dinner.trim() != NOT_SUBSCRIBED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberCacheRepository {
    connection: CsvConnection,
}

impl SubscriberCacheRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Replace the cache with the given subscribers
    pub fn store(&self, subscribers: &[Subscriber]) -> Result<()> {
        let path = self.connection.subscriber_cache_path();
        let temp_path = path.with_extension("tmp");
        {
            let mut writer = Writer::from_path(&temp_path)?;
            for subscriber in subscribers {
                writer.serialize(SubscriberRecord::from(subscriber))?;
            }
            if subscribers.is_empty() {
                writer.write_record(["Student Name", "Registration Number", "Breakfast", "Lunch", "Dinner"])?;
            }
            writer.flush()?;
        }
        fs::rename(&temp_path, &path)?;
        info!("Stored {} subscribers in {}", subscribers.len(), path.display());
        Ok(())
    }

    /// Load the cached subscribers; a missing cache is `DocumentNotFound`
    pub fn load(&self) -> StoreResult<Vec<Subscriber>> {
        let path = self.connection.subscriber_cache_path();
        if !path.exists() {
            return Err(StoreError::DocumentNotFound(path.display().to_string()));
        }

        let mut reader = Reader::from_path(&path)?;
        let mut subscribers = Vec::new();
        for record in reader.deserialize::<SubscriberRecord>() {
            subscribers.push(Subscriber::from(record?));
        }
        Ok(subscribers)
    }

    pub fn exists(&self) -> bool {
        self.connection.subscriber_cache_path().exists()
    }
}
