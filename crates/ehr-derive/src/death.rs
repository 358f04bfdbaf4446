//! Mortality derivation: cause-of-death events split by provenance level.

use std::path::Path;

use polars::prelude::*;
use tracing::info;

use ehr_common::unique_rows;
use ehr_model::{DeathLevel, RawTable, Result};

use crate::io::{DerivedTable, read_standardized, write_canonical};

/// Derives the primary- and secondary-cause mortality tables.
///
/// Every cause row receives its subject's death date via subject-keyed
/// lookup; death dates are deduplicated before the lookup. Exact duplicate
/// cause rows collapse, but distinct codes at the same level and date for
/// one subject are all preserved.
pub fn derive_death(std_dir: &Path, final_dir: &Path) -> Result<Vec<DerivedTable>> {
    info!("loading death causes");
    let causes = read_standardized(std_dir, RawTable::DeathCause)?;

    info!("loading death dates");
    let dates = read_standardized(std_dir, RawTable::DeathDate)?.select(["eid", "date_of_death"])?;
    let dates = unique_rows(&dates)?;

    let joined = causes
        .lazy()
        .join(
            dates.lazy(),
            [col("eid")],
            [col("eid")],
            JoinArgs {
                maintain_order: MaintainOrderJoin::Left,
                ..JoinArgs::new(JoinType::Left)
            },
        )
        .select([
            col("eid"),
            col("date_of_death").alias("date"),
            col("level"),
            col("cause_icd10").alias("feature"),
        ])
        .collect()?;
    let joined = unique_rows(&joined)?;

    let mut outputs = Vec::with_capacity(DeathLevel::ALL.len());
    for level in DeathLevel::ALL {
        info!(table = level.table_name(), "deriving mortality events");
        let levels = joined.column("level")?.i8()?;
        let keep: Vec<bool> = levels
            .into_iter()
            .map(|value| value == Some(level.code()))
            .collect();
        let mask = Series::new("keep".into(), keep);
        let mut df = joined
            .filter(mask.bool()?)?
            .select(["eid", "date", "feature"])?;
        outputs.push(write_canonical(&mut df, final_dir, level.table_name())?);
    }

    Ok(outputs)
}
