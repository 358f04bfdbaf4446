//! Polars helpers shared by the pipeline crates.
//!
//! Row-level operations (subject masks, exact-row dedup) work eagerly over
//! `AnyValue`s; the frames involved are modest once projected down to the
//! canonical column sets.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, Int32Chunked, IntoSeries, NewChunkedArray, PolarsResult,
    Series,
};

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`. Dates and categoricals render
/// through their logical value, not their physical encoding.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Days between the Unix epoch and `date`; the physical encoding of the
/// polars `Date` dtype.
pub fn to_epoch_days(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

/// Builds a `Date`-typed series from optional calendar dates.
pub fn date_series(name: &str, values: &[Option<NaiveDate>]) -> Series {
    let physical = Int32Chunked::from_iter_options(
        name.into(),
        values.iter().map(|value| value.map(to_epoch_days)),
    );
    physical.into_date().into_series()
}

/// Drops exact duplicate rows, keeping the first occurrence.
///
/// Rows are compared on every column via a composite rendered key, so two
/// rows are duplicates only when all their values match.
pub fn unique_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    if df.height() == 0 {
        return Ok(df.clone());
    }
    let columns = df.get_columns();
    let mut seen = BTreeSet::new();
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut composite = String::new();
        for (pos, column) in columns.iter().enumerate() {
            if pos > 0 {
                composite.push('|');
            }
            composite.push_str(&any_to_string(column.get(idx)?));
        }
        keep.push(seen.insert(composite));
    }
    let mask = BooleanChunked::from_slice("unique".into(), &keep);
    df.filter(&mask)
}

/// Keeps only rows whose `eid` is in `subjects`.
pub fn filter_subjects(df: &DataFrame, subjects: &HashSet<i32>) -> PolarsResult<DataFrame> {
    let eids = df.column("eid")?.i32()?;
    let keep: Vec<bool> = eids
        .into_iter()
        .map(|value| value.is_some_and(|eid| subjects.contains(&eid)))
        .collect();
    let mask = BooleanChunked::from_slice("subjects".into(), &keep);
    df.filter(&mask)
}

/// Drops every row whose `eid` is in `subjects`.
pub fn exclude_subjects(df: &DataFrame, subjects: &HashSet<i32>) -> PolarsResult<DataFrame> {
    let eids = df.column("eid")?.i32()?;
    let keep: Vec<bool> = eids
        .into_iter()
        .map(|value| value.is_none_or(|eid| !subjects.contains(&eid)))
        .collect();
    let mask = BooleanChunked::from_slice("consent".into(), &keep);
    df.filter(&mask)
}
