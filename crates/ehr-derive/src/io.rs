//! Parquet I/O at the derivation boundary.

use std::fs::File;
use std::path::Path;

use polars::prelude::{DataFrame, ParquetReader, ParquetWriter, SerReader};
use tracing::info;

use ehr_model::{EhrError, RawTable, Result};

/// A canonical table written by a derivation, with its row count.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    pub name: &'static str,
    pub rows: usize,
}

/// Reads one typed intermediate table from the standardized directory.
///
/// A missing table is fatal for the calling derivation.
pub fn read_standardized(std_dir: &Path, table: RawTable) -> Result<DataFrame> {
    let path = std_dir.join(format!("{}.parquet", table.table_name()));
    let file = File::open(&path).map_err(|error| EhrError::io(path.as_path(), error))?;
    Ok(ParquetReader::new(file).finish()?)
}

/// Writes a canonical event table, replacing any previous output.
pub fn write_canonical(
    df: &mut DataFrame,
    final_dir: &Path,
    name: &'static str,
) -> Result<DerivedTable> {
    let path = final_dir.join(format!("{name}.parquet"));
    let file = File::create(&path).map_err(|error| EhrError::io(path.as_path(), error))?;
    ParquetWriter::new(file).finish(df)?;
    info!(table = name, rows = df.height(), "wrote canonical table");
    Ok(DerivedTable {
        name,
        rows: df.height(),
    })
}
