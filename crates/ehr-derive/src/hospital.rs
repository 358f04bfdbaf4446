//! Hospital derivation: episode-dated diagnosis and procedure events.
//!
//! Episode dates resolve from the episode start date, falling back to the
//! admission date. Diagnosis and procedure detail rows join to that date
//! on the composite key (subject, episode index); procedure rows carry
//! their own operation date which takes priority over the episode date.

use std::path::Path;

use polars::prelude::*;
use tracing::info;

use ehr_model::{RawTable, Result};

use crate::io::{DerivedTable, read_standardized, write_canonical};

const DIAGNOSIS_OUTPUTS: [(&str, &str); 2] = [
    ("diag_icd9", "ehr_diagnosis_icd9"),
    ("diag_icd10", "ehr_diagnosis_icd10"),
];

const PROCEDURE_OUTPUTS: [(&str, &str); 2] = [
    ("oper3", "ehr_procedures_opcs3"),
    ("oper4", "ehr_procedures_opcs4"),
];

/// Ordered-precedence merge of two date columns: the primary value wins,
/// the fallback fills its nulls, and rows where both are null stay null.
fn date_with_fallback(primary: &str, fallback: &str) -> Expr {
    col(primary).fill_null(col(fallback))
}

/// Derives the four hospital event tables (two diagnosis coding systems,
/// two procedure coding systems).
pub fn derive_hospital(std_dir: &Path, final_dir: &Path) -> Result<Vec<DerivedTable>> {
    info!("loading hospital admission data");
    let episodes = read_standardized(std_dir, RawTable::Episode)?
        .lazy()
        .select([
            col("eid"),
            col("ins_index"),
            date_with_fallback("epistart", "admidate").alias("date"),
        ])
        .collect()?;

    let mut outputs = Vec::with_capacity(DIAGNOSIS_OUTPUTS.len() + PROCEDURE_OUTPUTS.len());

    info!("loading hospital diagnosis data");
    let diagnoses = read_standardized(std_dir, RawTable::DiagnosisDetail)?;
    for (code_column, name) in DIAGNOSIS_OUTPUTS {
        info!(table = name, "deriving diagnosis events");
        let mut df = diagnoses
            .clone()
            .lazy()
            .filter(col(code_column).is_not_null())
            .select([
                col("eid"),
                col("ins_index"),
                col("level").alias("source"),
                col(code_column).alias("feature"),
            ])
            .join(
                episodes.clone().lazy(),
                [col("eid"), col("ins_index")],
                [col("eid"), col("ins_index")],
                JoinArgs {
                    maintain_order: MaintainOrderJoin::Left,
                    ..JoinArgs::new(JoinType::Left)
                },
            )
            .select([col("eid"), col("date"), col("source"), col("feature")])
            .collect()?;
        outputs.push(write_canonical(&mut df, final_dir, name)?);
    }

    info!("loading hospital procedure data");
    let procedures = read_standardized(std_dir, RawTable::ProcedureDetail)?;
    for (code_column, name) in PROCEDURE_OUTPUTS {
        info!(table = name, "deriving procedure events");
        let mut df = procedures
            .clone()
            .lazy()
            .filter(col(code_column).is_not_null())
            .select([
                col("eid"),
                col("ins_index"),
                col("level").alias("source"),
                col(code_column).alias("feature"),
                col("opdate"),
            ])
            .join(
                episodes.clone().lazy(),
                [col("eid"), col("ins_index")],
                [col("eid"), col("ins_index")],
                JoinArgs {
                    maintain_order: MaintainOrderJoin::Left,
                    ..JoinArgs::new(JoinType::Left)
                },
            )
            // Operation date takes priority; the episode date only fills
            // rows where it is missing. Rows with neither keep a null
            // date and are retained.
            .select([
                col("eid"),
                date_with_fallback("opdate", "date").alias("date"),
                col("source"),
                col("feature"),
            ])
            .collect()?;
        outputs.push(write_canonical(&mut df, final_dir, name)?);
    }

    Ok(outputs)
}
