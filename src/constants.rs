use chrono::{NaiveDate, NaiveDateTime};

/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Sentinel `to_date` for the open-ended side of a `[from_date, to_date)`
/// validity window. A row carrying this date is the "current" row.
pub fn max_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .expect("static date")
        .and_hms_opt(0, 0, 0)
        .expect("static time")
}
