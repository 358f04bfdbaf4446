//! Raw extract standardization.
//!
//! One raw delimited extract goes in, one typed parquet table comes out:
//! columns projected to the table's descriptor, values coerced to their
//! declared types, dates parsed day-first, code columns dictionary-encoded
//! and withdrawn subjects removed. Re-running over unchanged inputs
//! reproduces an identical table; any prior output is overwritten.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info};

use ehr_common::date_series;
use ehr_model::{ColumnKind, EhrError, RawTable, Result};

use crate::dates::parse_date_day_first;
use crate::withdrawals::WithdrawalSet;

/// Standardizes all seven raw extract kinds in registry order.
///
/// Returns the per-table row counts of the standardized output.
pub fn standardize_all(
    raw_dir: &Path,
    withdrawals: &WithdrawalSet,
    std_dir: &Path,
) -> Result<Vec<(RawTable, usize)>> {
    let mut counts = Vec::with_capacity(RawTable::ALL.len());
    for table in RawTable::ALL {
        let rows = standardize_table(raw_dir, table, withdrawals, std_dir)?;
        counts.push((table, rows));
    }
    Ok(counts)
}

/// Standardizes a single raw extract into `<std_dir>/<table>.parquet`.
pub fn standardize_table(
    raw_dir: &Path,
    table: RawTable,
    withdrawals: &WithdrawalSet,
    std_dir: &Path,
) -> Result<usize> {
    let raw_path = raw_dir.join(table.file_name());
    info!(
        table = table.table_name(),
        path = %raw_path.display(),
        "loading raw extract"
    );

    let df = read_raw(&raw_path)?;
    check_schema(&df, table)?;
    let df = parse_date_columns(df, table)?;
    let df = coerce_columns(df, table)?;

    let before = df.height();
    let mut df = withdrawals.apply(&df)?;
    debug!(
        table = table.table_name(),
        removed = before - df.height(),
        "applied consent exclusions"
    );

    let out_path = std_dir.join(format!("{}.parquet", table.table_name()));
    write_parquet(&mut df, &out_path)?;
    info!(
        table = table.table_name(),
        rows = df.height(),
        path = %out_path.display(),
        "wrote standardized table"
    );
    Ok(df.height())
}

/// Reads a tab-delimited raw extract with every column as a string.
///
/// Primary-care extracts arrive latin-1 encoded in the wild, so decoding
/// is lossy rather than strict UTF-8.
fn read_raw(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(EhrError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "raw extract not found"),
        ));
    }
    let parse_options = CsvParseOptions::default()
        .with_separator(b'\t')
        .with_encoding(CsvEncoding::LossyUtf8);
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Every descriptor column must be present in the extract.
fn check_schema(df: &DataFrame, table: RawTable) -> Result<()> {
    let names = df.get_column_names();
    for column in table.descriptor().column_names() {
        if !names.iter().any(|name| name.as_str() == column) {
            return Err(EhrError::Schema {
                table: table.table_name(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Replaces each declared date column with its parsed `Date` series.
fn parse_date_columns(mut df: DataFrame, table: RawTable) -> Result<DataFrame> {
    for name in table.descriptor().date_columns() {
        let values: Vec<Option<NaiveDate>> = df
            .column(name)?
            .str()?
            .into_iter()
            .map(|value| value.and_then(parse_date_day_first))
            .collect();
        df.with_column(date_series(name, &values))?;
    }
    Ok(df)
}

/// Projects to the descriptor's columns in order and casts each to its
/// declared type. Undeclared columns are dropped here.
fn coerce_columns(df: DataFrame, table: RawTable) -> Result<DataFrame> {
    let exprs: Vec<Expr> = table
        .descriptor()
        .columns
        .iter()
        .map(|spec| match spec.kind {
            ColumnKind::Text | ColumnKind::Date => col(spec.name),
            kind => col(spec.name).cast(kind.dtype()),
        })
        .collect();
    Ok(df.lazy().select(exprs).collect()?)
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|error| EhrError::io(path, error))?;
    ParquetWriter::new(file).finish(df)?;
    Ok(())
}
