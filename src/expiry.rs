//! Warranty expiry computation.
//!
//! Warranty cards usually state a purchase date and a coverage period
//! ("2 years", "18 months") but rarely print the end date itself. When the
//! model could not read an expiry date we derive one with calendar-month
//! arithmetic: 31 January plus one month is 28 (or 29) February, never
//! 3 March.

use crate::record::WarrantyRecord;
use chrono::{Months, NaiveDate};
use tracing::debug;

/// Date format used for every date the service reads or writes.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Compute the expiry date for a purchase date and a warranty period.
///
/// `purchase_date` must be `DD-MM-YYYY`. `warranty_period` is matched
/// case-insensitively: if it mentions "year" its leading integer is taken as
/// years, otherwise if it mentions "month" as months. A period naming neither
/// unit adds nothing and the purchase date is returned unchanged.
///
/// Returns `None` for an unparseable date, a non-integer magnitude, or a
/// result outside chrono's date range.
///
/// ```
/// use warranty_extract::expiry::calculate_expiry;
///
/// assert_eq!(calculate_expiry("15-01-2023", "2 years").as_deref(), Some("15-01-2025"));
/// assert_eq!(calculate_expiry("31-01-2023", "1 month").as_deref(), Some("28-02-2023"));
/// assert_eq!(calculate_expiry("31-13-2024", "1 year"), None);
/// ```
pub fn calculate_expiry(purchase_date: &str, warranty_period: &str) -> Option<String> {
    let start = NaiveDate::parse_from_str(purchase_date, DATE_FORMAT).ok()?;
    let months = period_in_months(warranty_period)?;
    let end = add_months(start, months)?;
    Some(end.format(DATE_FORMAT).to_string())
}

/// Number of calendar months described by a warranty period string.
///
/// `Some(0)` when no unit is recognised; `None` when a unit is present but the
/// magnitude is not an integer.
fn period_in_months(warranty_period: &str) -> Option<i64> {
    let period = warranty_period.to_lowercase();
    if period.contains("year") {
        leading_integer(&period)?.checked_mul(12)
    } else if period.contains("month") {
        leading_integer(&period)
    } else {
        Some(0)
    }
}

/// The first whitespace-separated token, parsed as a signed integer.
fn leading_integer(period: &str) -> Option<i64> {
    period.split_whitespace().next()?.parse().ok()
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

/// Fill in `expiry_date` when the model left it empty.
///
/// Only acts when `expiry_date` is missing and both `purchase_date` and
/// `warranty_period` are present. Returns `true` if a date was written.
/// A failed computation leaves the record untouched.
pub fn backfill_expiry(record: &mut WarrantyRecord) -> bool {
    if record.expiry_date.is_some() {
        return false;
    }
    let (Some(purchase), Some(period)) = (
        record.purchase_date.as_deref(),
        record.warranty_period.as_deref(),
    ) else {
        return false;
    };

    match calculate_expiry(purchase, period) {
        Some(expiry) => {
            debug!("Backfilled expiry_date {} from {} + {:?}", expiry, purchase, period);
            record.expiry_date = Some(expiry);
            true
        }
        None => {
            debug!(
                "Could not compute expiry from purchase_date={:?} warranty_period={:?}",
                purchase, period
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_are_twelve_months() {
        assert_eq!(calculate_expiry("15-01-2023", "2 years").as_deref(), Some("15-01-2025"));
        assert_eq!(calculate_expiry("15-01-2023", "1 Year").as_deref(), Some("15-01-2024"));
        assert_eq!(calculate_expiry("10-06-2020", "5 YEARS").as_deref(), Some("10-06-2025"));
    }

    #[test]
    fn months_clamp_to_end_of_month() {
        assert_eq!(calculate_expiry("31-01-2023", "1 month").as_deref(), Some("28-02-2023"));
        assert_eq!(calculate_expiry("31-01-2024", "1 month").as_deref(), Some("29-02-2024"));
        assert_eq!(calculate_expiry("31-08-2023", "6 months").as_deref(), Some("29-02-2024"));
        assert_eq!(calculate_expiry("30-11-2023", "3 months").as_deref(), Some("29-02-2024"));
    }

    #[test]
    fn leap_day_plus_year_clamps() {
        assert_eq!(calculate_expiry("29-02-2024", "1 year").as_deref(), Some("28-02-2025"));
        assert_eq!(calculate_expiry("29-02-2024", "4 years").as_deref(), Some("29-02-2028"));
    }

    #[test]
    fn year_takes_precedence_over_month() {
        // "1 year 6 months" only counts the leading number as years.
        assert_eq!(
            calculate_expiry("01-01-2023", "1 year 6 months").as_deref(),
            Some("01-01-2024")
        );
    }

    #[test]
    fn unknown_unit_returns_purchase_date() {
        assert_eq!(calculate_expiry("15-01-2023", "lifetime").as_deref(), Some("15-01-2023"));
        assert_eq!(calculate_expiry("15-01-2023", "").as_deref(), Some("15-01-2023"));
        assert_eq!(calculate_expiry("15-01-2023", "90 days").as_deref(), Some("15-01-2023"));
    }

    #[test]
    fn malformed_inputs_report_failure() {
        assert_eq!(calculate_expiry("31-13-2024", "1 year"), None);
        assert_eq!(calculate_expiry("", "1 year"), None);
        assert_eq!(calculate_expiry("2023-01-15", "1 year"), None);
        assert_eq!(calculate_expiry("30-02-2023", "1 year"), None);
        assert_eq!(calculate_expiry("15-01-2023", "two years"), None);
        assert_eq!(calculate_expiry("15-01-2023", "months: 6"), None);
    }

    #[test]
    fn huge_magnitude_fails_instead_of_panicking() {
        assert_eq!(calculate_expiry("15-01-2023", "99999999999 years"), None);
        assert_eq!(calculate_expiry("15-01-2023", "9223372036854775807 years"), None);
    }

    #[test]
    fn negative_period_goes_backwards() {
        assert_eq!(calculate_expiry("31-03-2023", "-1 month").as_deref(), Some("28-02-2023"));
    }

    #[test]
    fn idempotent() {
        let a = calculate_expiry("31-01-2023", "13 months");
        let b = calculate_expiry("31-01-2023", "13 months");
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("29-02-2024"));
    }

    #[test]
    fn backfill_fills_missing_expiry() {
        let mut record = WarrantyRecord {
            purchase_date: Some("15-01-2023".into()),
            warranty_period: Some("2 years".into()),
            ..Default::default()
        };
        assert!(backfill_expiry(&mut record));
        assert_eq!(record.expiry_date.as_deref(), Some("15-01-2025"));
    }

    #[test]
    fn backfill_keeps_existing_expiry() {
        let mut record = WarrantyRecord {
            purchase_date: Some("15-01-2023".into()),
            warranty_period: Some("2 years".into()),
            expiry_date: Some("01-01-2030".into()),
            ..Default::default()
        };
        assert!(!backfill_expiry(&mut record));
        assert_eq!(record.expiry_date.as_deref(), Some("01-01-2030"));
    }

    #[test]
    fn backfill_needs_both_inputs() {
        let mut record = WarrantyRecord {
            purchase_date: Some("15-01-2023".into()),
            ..Default::default()
        };
        assert!(!backfill_expiry(&mut record));
        assert_eq!(record.expiry_date, None);
    }

    #[test]
    fn backfill_failure_leaves_null() {
        let mut record = WarrantyRecord {
            purchase_date: Some("January 2023".into()),
            warranty_period: Some("1 year".into()),
            ..Default::default()
        };
        assert!(!backfill_expiry(&mut record));
        assert_eq!(record.expiry_date, None);
    }
}
