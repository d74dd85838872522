//! Sheet names and header rows shared by the local workbook and the mirror document.

use shared::Meal;

pub const ROSTER_SHEET: &str = "Prepaid Sheet";
pub const CALCULATIONS_SHEET: &str = "Calculations";
/// Mirror-only sheet receiving error-level event log entries
pub const LOG_SHEET: &str = "Log";

pub const ROSTER_HEADER: [&str; 8] = [
    "Student Name",
    "Registration Number",
    "Breakfast",
    "Breakfast Time",
    "Lunch",
    "Lunch Time",
    "Dinner",
    "Dinner Time",
];

pub const COUPON_HEADER: [&str; 3] = ["Registration Number", "Amount", "Time"];

pub const LOG_HEADER: [&str; 2] = ["Time", "Message"];

pub const NAME_COLUMN: usize = 0;
pub const REGISTRATION_COLUMN: usize = 1;

pub const COUPON_AMOUNT_COLUMN: usize = 1;

pub fn coupon_sheet(meal: Meal) -> String {
    format!("Coupons {}", meal.as_str())
}

pub fn header_row(header: &[&str]) -> Vec<String> {
    header.iter().map(|cell| cell.to_string()).collect()
}

/// Sheets of a local day workbook, in creation order
pub fn workbook_sheets() -> Vec<String> {
    let mut sheets = vec![ROSTER_SHEET.to_string()];
    sheets.extend(Meal::ALL.iter().map(|meal| coupon_sheet(*meal)));
    sheets.push(CALCULATIONS_SHEET.to_string());
    sheets
}

/// Sheets of a mirror day document: the workbook sheets plus the log
pub fn mirror_sheets() -> Vec<String> {
    let mut sheets = workbook_sheets();
    sheets.push(LOG_SHEET.to_string());
    sheets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_sets() {
        assert_eq!(coupon_sheet(Meal::Lunch), "Coupons Lunch");
        assert_eq!(workbook_sheets().len(), 5);
        assert_eq!(mirror_sheets().last().map(String::as_str), Some(LOG_SHEET));
    }
}
