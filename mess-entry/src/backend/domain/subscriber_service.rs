//! Subscriber synchronisation.
//!
//! Subscribers sign up through several form spreadsheets. A repository
//! details document says where they are: its second column holds six
//! comma-separated cells, one per row:
//!
//! ```text
//! row 0: file names            "Mess Form 2025, Mess Form 2024"
//! row 1: sheet names           "Form Responses 1, Form Responses 1"
//! row 2: name column indices   "1, 2"
//! row 3: registration columns  "2, 3"
//! row 4: meal columns          "4, 5"
//! row 5: share recipients      "warden@iisermohali.ac.in"
//! ```
//!
//! Only the first index of each column kind is used for every form.

use log::{debug, info};
use std::collections::HashSet;

use crate::backend::domain::errors::{EntryError, EntryResult};
use crate::backend::domain::models::subscriber::{registration_from_email, Subscriber};
use crate::backend::storage::csv::config_repository::SourceConfig;
use crate::backend::storage::csv::SubscriberCacheRepository;
use crate::backend::storage::{MirrorService, TabularStore};

const DETAILS_COLUMN: usize = 1;
const PUBLISHED_HEADER: [&str; 3] = ["Student Name", "Registration Number", "Meals Opted"];

/// Location of the subscriber forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDetails {
    pub file_names: Vec<String>,
    pub sheet_names: Vec<String>,
    pub name_columns: Vec<usize>,
    pub registration_columns: Vec<usize>,
    pub meal_columns: Vec<usize>,
    pub share_emails: Vec<String>,
}

fn split_cell(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn parse_indices(cell: &str, what: &str) -> EntryResult<Vec<usize>> {
    let indices = split_cell(cell)
        .iter()
        .map(|value| {
            value
                .parse::<usize>()
                .map_err(|_| EntryError::Invalid(format!("Invalid {} column '{}' in repository details", what, value)))
        })
        .collect::<EntryResult<Vec<_>>>()?;
    if indices.is_empty() {
        return Err(EntryError::Invalid(format!("No {} column in repository details", what)));
    }
    Ok(indices)
}

impl RepositoryDetails {
    /// Parse the details column; the recipients cell may be missing
    pub fn parse(column: &[String]) -> EntryResult<Self> {
        if column.len() < 5 {
            return Err(EntryError::Invalid(format!(
                "Repository details need at least 5 rows, found {}",
                column.len()
            )));
        }

        let details = Self {
            file_names: split_cell(&column[0]),
            sheet_names: split_cell(&column[1]),
            name_columns: parse_indices(&column[2], "name")?,
            registration_columns: parse_indices(&column[3], "registration number")?,
            meal_columns: parse_indices(&column[4], "meal")?,
            share_emails: column.get(5).map(|cell| split_cell(cell)).unwrap_or_default(),
        };

        let files = details.file_names.len();
        let lengths = [
            ("sheets", details.sheet_names.len()),
            ("name columns", details.name_columns.len()),
            ("registration number columns", details.registration_columns.len()),
            ("meal columns", details.meal_columns.len()),
        ];
        for (what, count) in lengths {
            if count != files {
                return Err(EntryError::Invalid(format!(
                    "Repository details list {} files but {} {}",
                    files, count, what
                )));
            }
        }
        Ok(details)
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberService {
    sources: SourceConfig,
    cache: SubscriberCacheRepository,
}

impl SubscriberService {
    pub fn new(sources: SourceConfig, cache: SubscriberCacheRepository) -> Self {
        Self { sources, cache }
    }

    pub fn read_repository_details<M: MirrorService>(&self, mirror: &M) -> EntryResult<RepositoryDetails> {
        let reference = &self.sources.repository_details;
        let document = mirror.open(&reference.document)?;
        let column = document.column(&reference.sheet, DETAILS_COLUMN)?;
        RepositoryDetails::parse(&column)
    }

    /// Read every form listed in `details`, each with its own column positions.
    /// Duplicates keep the first occurrence.
    pub fn collect_subscribers<M: MirrorService>(
        &self,
        mirror: &M,
        details: &RepositoryDetails,
    ) -> EntryResult<Vec<Subscriber>> {
        let mut seen = HashSet::new();
        let mut subscribers = Vec::new();

        let forms = details
            .file_names
            .iter()
            .zip(&details.sheet_names)
            .zip(&details.name_columns)
            .zip(&details.registration_columns)
            .zip(&details.meal_columns);
        for ((((file, sheet), &name_column), &registration_column), &meal_column) in forms {
            let document = mirror.open(file)?;
            let rows = document.rows(sheet)?;
            debug!("Reading {} subscriber rows from {}/{}", rows.len().saturating_sub(1), file, sheet);

            for row in rows.iter().skip(1) {
                let cell = |col: usize| row.get(col).map(String::as_str).unwrap_or_default();
                let registration_number = registration_from_email(cell(registration_column));
                if registration_number.is_empty() || !seen.insert(registration_number.clone()) {
                    continue;
                }
                subscribers.push(Subscriber::new(cell(name_column), &registration_number, cell(meal_column)));
            }
        }

        Ok(subscribers)
    }

    /// Rebuild the subscriber list from the forms, publish it to the mirror's
    /// subscriber repository and replace the local cache.
    pub fn sync<M: MirrorService>(&self, mirror: &M) -> EntryResult<Vec<Subscriber>> {
        let details = self.read_repository_details(mirror)?;
        let subscribers = self.collect_subscribers(mirror, &details)?;

        let reference = &self.sources.subscriber_repository;
        let mut repository = mirror.open(&reference.document)?;
        let mut rows = vec![PUBLISHED_HEADER.iter().map(|c| c.to_string()).collect::<Vec<_>>()];
        rows.extend(subscribers.iter().map(|subscriber| {
            let meals = subscriber
                .subscribed_meals()
                .iter()
                .map(|meal| meal.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            vec![subscriber.name.clone(), subscriber.registration_number.clone(), meals]
        }));
        repository.add_sheet(&reference.sheet)?;
        repository.replace_rows(&reference.sheet, &rows)?;

        self.cache.store(&subscribers)?;
        info!("Synced {} subscribers", subscribers.len());
        Ok(subscribers)
    }

    /// Subscribers from the local cache
    pub fn cached(&self) -> EntryResult<Vec<Subscriber>> {
        self.cache.load().map_err(|e| {
            if e.is_not_found() {
                EntryError::NotFound("Subscriber Data File not found!".to_string())
            } else {
                e.into()
            }
        })
    }
}
