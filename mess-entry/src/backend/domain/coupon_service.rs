//! Coupon ledger: walk-in sales appended per meal, locally and to the mirror.

use log::{info, warn};

use crate::backend::domain::commands::coupon::{CouponCommand, CouponOutcome};
use crate::backend::domain::errors::{EntryError, EntryResult};
use crate::backend::domain::models::coupon::CouponRecord;
use crate::backend::domain::models::layout::coupon_sheet;
use crate::backend::storage::TabularStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct CouponService;

impl CouponService {
    pub fn new() -> Self {
        Self
    }

    /// Append a coupon to the meal's sheet and save the workbook.
    /// The mirror append is best-effort and reported through `warnings`.
    pub fn record<L, R>(
        &self,
        local: &mut L,
        remote: Option<&mut R>,
        command: &CouponCommand,
        time: &str,
    ) -> EntryResult<CouponOutcome>
    where
        L: TabularStore,
        R: TabularStore,
    {
        if command.identifier.trim().is_empty() {
            return Err(EntryError::Invalid("Enter a name or registration number for the coupon".to_string()));
        }

        let sheet = coupon_sheet(command.meal);
        let record = CouponRecord::new(&command.identifier, &command.price, time);
        let row = record.to_row();

        local.append_row(&sheet, &row)?;

        let mut warnings = Vec::new();
        let mut mirrored = false;
        if let Some(document) = remote {
            match document.append_row(&sheet, &row) {
                Ok(()) => mirrored = true,
                Err(e) => {
                    warn!("Online coupon append failed for {}: {}", record.identifier, e);
                    warnings.push(format!("Coupon not added online: {}", e));
                }
            }
        }

        local.flush()?;

        let coupons_sold = local.row_count(&sheet)?.saturating_sub(1);
        info!(
            "Coupon for {} at {} ({}), {} sold",
            record.identifier, record.amount, command.meal, coupons_sold
        );

        Ok(CouponOutcome {
            record,
            meal: command.meal,
            coupons_sold,
            mirrored,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::layout::{header_row, COUPON_HEADER};
    use crate::backend::storage::csv::Workbook;
    use crate::backend::storage::mirror::memory::{MemoryDocument, MemoryMirror};
    use crate::backend::storage::MirrorService;
    use anyhow::Result;
    use shared::Meal;
    use tempfile::TempDir;

    fn workbook(temp_dir: &TempDir) -> Result<Workbook> {
        let mut workbook = Workbook::create(temp_dir.path().join("day"));
        workbook.add_sheet("Coupons Lunch")?;
        workbook.append_row("Coupons Lunch", &header_row(&COUPON_HEADER))?;
        Ok(workbook)
    }

    fn command(identifier: &str, price: &str) -> CouponCommand {
        CouponCommand {
            identifier: identifier.to_string(),
            price: price.to_string(),
            meal: Meal::Lunch,
        }
    }

    #[test]
    fn test_unparsable_price_records_zero() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut local = workbook(&temp_dir)?;

        let outcome = CouponService::new().record(
            &mut local,
            None::<&mut MemoryDocument>,
            &command("Guest of MS25001", "abc"),
            "13:02:44",
        )?;

        assert_eq!(outcome.record.amount, 0.0);
        assert_eq!(outcome.coupons_sold, 1);
        assert!(!outcome.mirrored);

        let saved = Workbook::load(temp_dir.path().join("day"))?;
        assert_eq!(saved.row("Coupons Lunch", 1)?, vec!["Guest of MS25001", "0", "13:02:44"]);
        Ok(())
    }

    #[test]
    fn test_running_count_and_mirror_append() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut local = workbook(&temp_dir)?;
        let mirror = MemoryMirror::new();
        mirror.insert_sheet("day", "Coupons Lunch", vec![header_row(&COUPON_HEADER)]);
        let mut document = mirror.open("day")?;

        let service = CouponService::new();
        service.record(&mut local, Some(&mut document), &command("Ravi", "40"), "12:00:00")?;
        let outcome = service.record(&mut local, Some(&mut document), &command("Meera", "40.5"), "12:01:00")?;

        assert_eq!(outcome.coupons_sold, 2);
        assert!(outcome.mirrored);
        assert_eq!(mirror.sheet("day", "Coupons Lunch").unwrap()[2][1], "40.5");
        Ok(())
    }

    #[test]
    fn test_blank_identifier_is_invalid() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut local = workbook(&temp_dir)?;
        let err = CouponService::new()
            .record(&mut local, None::<&mut MemoryDocument>, &command("  ", "10"), "12:00:00")
            .unwrap_err();
        assert!(matches!(err, EntryError::Invalid(_)));
        assert_eq!(local.row_count("Coupons Lunch")?, 1);
        Ok(())
    }
}
