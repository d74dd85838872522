//! Day file publication and the day creation report.

use log::{info, warn};
use shared::{Meal, MealCounts, MirrorState};

use crate::backend::domain::commands::day::{MirrorPublication, RosterCounts};
use crate::backend::domain::models::layout::{
    header_row, mirror_sheets, workbook_sheets, LOG_HEADER, LOG_SHEET, ROSTER_SHEET,
};
use crate::backend::storage::csv::Workbook;
use crate::backend::storage::{MirrorService, StoreResult, TabularStore};

#[derive(Debug, Clone)]
pub struct DayService {
    share_recipients: Vec<String>,
}

impl DayService {
    pub fn new(share_recipients: Vec<String>) -> Self {
        Self { share_recipients }
    }

    /// Open the day's mirror document, or create it as a copy of `workbook`.
    ///
    /// A new document gets the full sheet set and every sheet of the workbook
    /// in one batch per sheet before it is shared with the configured
    /// recipients plus `extra_recipients`. A failed share is a warning on the
    /// publication. An existing document is reused untouched unless it has no
    /// roster sheet, in which case its sheets are filled in.
    pub fn publish_mirror<M: MirrorService>(
        &self,
        mirror: &M,
        day_id: &str,
        workbook: &Workbook,
        extra_recipients: &[String],
    ) -> StoreResult<MirrorPublication<M::Document>> {
        let (mut document, state) = match mirror.open(day_id) {
            Ok(document) => {
                if document.sheet_names()?.iter().any(|sheet| sheet == ROSTER_SHEET) {
                    info!("Mirror document {} already exists, reusing it", day_id);
                    return Ok(MirrorPublication {
                        document,
                        state: MirrorState::Reused,
                        warnings: Vec::new(),
                    });
                }
                warn!("Mirror document {} has no roster sheet, filling it in", day_id);
                (document, MirrorState::Created)
            }
            Err(e) if e.is_not_found() => (mirror.create(day_id)?, MirrorState::Created),
            Err(e) => return Err(e),
        };

        for sheet in mirror_sheets() {
            document.add_sheet(&sheet)?;
        }
        for sheet in workbook_sheets() {
            document.replace_rows(&sheet, &workbook.rows(&sheet)?)?;
        }
        document.replace_rows(LOG_SHEET, &[header_row(&LOG_HEADER)])?;

        let mut recipients: Vec<&String> = Vec::new();
        for recipient in self.share_recipients.iter().chain(extra_recipients) {
            if !recipients.contains(&recipient) {
                recipients.push(recipient);
            }
        }
        let mut warnings = Vec::new();
        for recipient in recipients {
            if let Err(e) = mirror.share(day_id, recipient) {
                warn!("Sharing {} with {} failed: {}", day_id, recipient, e);
                warnings.push(format!("Online sheet not shared with {}: {}", recipient, e));
            }
        }

        info!("Published mirror document {}", day_id);
        Ok(MirrorPublication {
            document,
            state,
            warnings,
        })
    }

    /// Subscribers, leaves and food to be prepared per meal
    pub fn render_report(&self, counts: &RosterCounts) -> String {
        let section = |title: &str, values: &MealCounts| {
            let mut text = format!("{}:\n", title);
            for meal in Meal::ALL {
                text.push_str(&format!("• {}: {}\n", meal, values.get(meal)));
            }
            text
        };

        [
            section("Subscribers", &counts.subscribers),
            section("Leaves", &counts.leaves),
            section("Food to be Prepared", &counts.to_prepare()),
        ]
        .join("\n")
    }
}
