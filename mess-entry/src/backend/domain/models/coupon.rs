//! mess-entry/src/backend/domain/models/coupon.rs

use super::layout::COUPON_AMOUNT_COLUMN;

/// A walk-in sale recorded in a meal's coupon sheet
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRecord {
    /// Name or registration number of the buyer
    pub identifier: String,
    pub amount: f64,
    pub time: String,
}

impl CouponRecord {
    pub fn new(identifier: &str, price: &str, time: &str) -> Self {
        Self {
            identifier: identifier.trim().to_string(),
            amount: parse_price(price),
            time: time.to_string(),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![self.identifier.clone(), self.amount.to_string(), self.time.clone()]
    }
}

/// Parse a free-text price. Anything that is not a finite number counts as 0.0.
pub fn parse_price(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Number of coupons and summed amount over a coupon sheet, header excluded
pub fn tally_coupons(rows: &[Vec<String>]) -> (usize, f64) {
    let data_rows = rows.iter().skip(1);
    data_rows.fold((0, 0.0), |(count, total), row| {
        let amount = row.get(COUPON_AMOUNT_COLUMN).map(|c| parse_price(c)).unwrap_or(0.0);
        (count + 1, total + amount)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("30"), 30.0);
        assert_eq!(parse_price(" 42.5 "), 42.5);
        assert_eq!(parse_price("abc"), 0.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("NaN"), 0.0);
    }

    #[test]
    fn test_unparsable_price_still_makes_a_record() {
        let record = CouponRecord::new("Guest", "abc", "13:10:00");
        assert_eq!(record.amount, 0.0);
        assert_eq!(record.to_row(), vec!["Guest", "0", "13:10:00"]);
    }

    #[test]
    fn test_tally_ignores_header_and_blank_amounts() {
        let rows = vec![
            vec!["Registration Number".to_string(), "Amount".to_string(), "Time".to_string()],
            vec!["MS25001".to_string(), "30".to_string(), "12:00:00".to_string()],
            vec!["Guest".to_string(), "".to_string(), "12:05:00".to_string()],
            vec!["Guest".to_string(), "45.5".to_string()],
        ];
        assert_eq!(tally_coupons(&rows), (3, 75.5));
    }
}
