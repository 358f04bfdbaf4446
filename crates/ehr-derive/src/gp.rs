//! Primary-care derivation: clinical code events and medication issues.
//!
//! Primary care has no severity tiering, so these tables carry no
//! provenance level column.

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use ehr_common::unique_rows;
use ehr_model::{RawTable, Result};

use crate::io::{DerivedTable, read_standardized, write_canonical};

const CLINICAL_OUTPUTS: [(&str, &str); 2] = [
    ("read_2", "ehr_diagnosis_read2"),
    ("read_3", "ehr_diagnosis_read3"),
];

/// Derives the two clinical vocabulary tables and the medication table.
///
/// `today` bounds prescription issue dates: an issue date in the future is
/// a data error and its row is dropped. The caller supplies the processing
/// date so the derivation itself stays deterministic.
pub fn derive_gp(std_dir: &Path, final_dir: &Path, today: NaiveDate) -> Result<Vec<DerivedTable>> {
    let mut outputs = Vec::with_capacity(CLINICAL_OUTPUTS.len() + 1);

    info!("loading primary-care clinical data");
    let clinical = read_standardized(std_dir, RawTable::GpClinical)?;
    for (code_column, name) in CLINICAL_OUTPUTS {
        info!(table = name, "deriving clinical code events");
        let df = clinical
            .clone()
            .lazy()
            .filter(col(code_column).is_not_null().and(col("event_dt").is_not_null()))
            .select([
                col("eid"),
                col("event_dt").alias("date"),
                col(code_column).alias("feature"),
            ])
            .collect()?;
        let mut df = unique_rows(&df)?;
        outputs.push(write_canonical(&mut df, final_dir, name)?);
    }

    info!("loading primary-care prescription data");
    let scripts = read_standardized(std_dir, RawTable::GpScripts)?;
    let issue_dates = scripts.column("issue_date")?.date()?;
    let drug_names = scripts.column("drug_name")?.str()?;
    let keep: Vec<bool> = issue_dates
        .as_date_iter()
        .zip(drug_names.into_iter())
        .map(|(date, drug)| match (date, drug) {
            (Some(date), Some(_)) => date <= today,
            _ => false,
        })
        .collect();
    let mask = Series::new("keep".into(), keep);
    let df = scripts
        .filter(mask.bool()?)?
        .lazy()
        .select([
            col("eid"),
            col("issue_date").alias("date"),
            col("drug_name").alias("feature"),
        ])
        .collect()?;
    let mut df = unique_rows(&df)?;
    outputs.push(write_canonical(&mut df, final_dir, "gp_medications")?);

    Ok(outputs)
}
