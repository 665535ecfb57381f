//! Reporting-period parsing.

use chrono::NaiveDate;

use crate::constants::derivation::PERIOD_DATE_FORMAT;

/// Parse a `DD/MM/YYYY` reporting-period date.
///
/// The year must have exactly four digits; `%Y` alone would read `15` as the
/// year 15 instead of rejecting it.
pub fn parse_period_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let year = text.rsplit('/').next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(text, PERIOD_DATE_FORMAT).ok()
}

/// Whole days from `start` to `end`; missing when either side does not parse.
pub fn period_days(start: Option<&str>, end: Option<&str>) -> Option<i64> {
    let start = parse_period_date(start?)?;
    let end = parse_period_date(end?)?;
    Some((end - start).num_days())
}
