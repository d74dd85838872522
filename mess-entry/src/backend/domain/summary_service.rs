//! Aggregator: per-meal counts over the roster and the coupon ledgers.
//!
//! For every meal the five roster categories (veg, non-veg, leave, not
//! subscribed, not availed) partition the roster rows exactly. The rendered
//! summary is written one line per row into column A of the calculations
//! sheet, replacing whatever was there.

use log::info;
use shared::{Meal, MealSummary};

use crate::backend::domain::models::coupon::tally_coupons;
use crate::backend::domain::models::layout::{coupon_sheet, CALCULATIONS_SHEET, ROSTER_SHEET};
use crate::backend::domain::models::meal::{MealStatus, Variant};
use crate::backend::domain::models::roster::Roster;
use crate::backend::storage::{StoreResult, TabularStore};

const SECTION_END: &str = "-----x-----";

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Count every meal of the day in `store`
    pub fn tally<S: TabularStore>(&self, store: &S) -> StoreResult<Vec<MealSummary>> {
        let roster = Roster::from_rows(&store.rows(ROSTER_SHEET)?);

        let mut summaries = Vec::with_capacity(Meal::ALL.len());
        for meal in Meal::ALL {
            let mut summary = Self::count_roster(&roster, meal);
            let (coupon_count, coupon_amount) = tally_coupons(&store.rows(&coupon_sheet(meal))?);
            summary.coupon_count = coupon_count;
            summary.coupon_amount = coupon_amount;
            summaries.push(summary);
        }
        Ok(summaries)
    }

    fn count_roster(roster: &Roster, meal: Meal) -> MealSummary {
        let mut summary = MealSummary {
            meal,
            veg: 0,
            non_veg: 0,
            leave: 0,
            not_subscribed: 0,
            not_availed: 0,
            coupon_count: 0,
            coupon_amount: 0.0,
        };

        for entry in &roster.entries {
            match entry.status(meal) {
                MealStatus::Consumed(Variant::Veg) => summary.veg += 1,
                MealStatus::Consumed(Variant::NonVeg) => summary.non_veg += 1,
                MealStatus::Leave => summary.leave += 1,
                MealStatus::NotSubscribed => summary.not_subscribed += 1,
                MealStatus::Unset => {}
            }
        }
        summary.not_availed = roster.len()
            - summary.veg
            - summary.non_veg
            - summary.leave
            - summary.not_subscribed;
        summary
    }

    /// Summary text, one entry per line
    pub fn render_lines(&self, summaries: &[MealSummary]) -> Vec<String> {
        let mut lines = Vec::new();
        for summary in summaries {
            lines.push(format!("{}:", summary.meal));
            lines.push(format!("• Veg: {}", summary.veg));
            lines.push(format!("• Non-Veg: {}", summary.non_veg));
            lines.push(format!("• Leave: {}", summary.leave));
            lines.push(format!("• Not Subscribed: {}", summary.not_subscribed));
            lines.push(format!("• Not Availed: {}", summary.not_availed));
            lines.push(format!("• Coupons: {}", summary.coupon_count));
            lines.push(format!("• Coupon Amount: {:.1}", summary.coupon_amount));
            lines.push(SECTION_END.to_string());
            lines.push(String::new());
        }
        lines
    }

    /// Overwrite the calculations sheet with the rendered lines
    pub fn write_report<S: TabularStore>(&self, store: &mut S, lines: &[String]) -> StoreResult<()> {
        let rows: Vec<Vec<String>> = lines.iter().map(|line| vec![line.clone()]).collect();
        store.add_sheet(CALCULATIONS_SHEET)?;
        store.replace_rows(CALCULATIONS_SHEET, &rows)?;
        store.flush()?;
        info!("Wrote {} summary lines", rows.len());
        Ok(())
    }
}
