//! Day-first date parsing for raw extracts.
//!
//! Raw clinical extracts carry dates in day-first regional formats, with
//! ISO dates appearing in newer deliveries. Formats are tried in a fixed
//! order; anything unparseable becomes null rather than a sentinel value.

use chrono::NaiveDate;

const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Parses a raw date cell under the day-first convention.
///
/// Returns `None` for empty or unparseable values.
pub fn parse_date_day_first(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}
