//! Pipeline orchestration and registry listing.
//!
//! The run command executes the stages strictly in sequence: every stage
//! assumes the previous one completed fully. On failure the full error
//! chain is logged and the error re-raised to the caller; there are no
//! retries and no partial resumption.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::Table;
use serde::Serialize;
use tracing::{error, info};

use ehr_derive::{derive_death, derive_gp, derive_hospital};
use ehr_ingest::{WithdrawalSet, standardize_all};
use ehr_model::{DeathLevel, GpSource, HospitalSource, RawTable};

use crate::cli::RunArgs;

#[derive(Debug, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
}

/// Row counts for everything a pipeline run wrote.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub standardized: Vec<TableCount>,
    pub canonical: Vec<TableCount>,
}

/// Runs the pipeline, logging the failure chain before re-raising.
pub fn run(args: &RunArgs) -> Result<RunSummary> {
    run_pipeline(args).inspect_err(|err| {
        error!("pipeline failed: {err:#}");
    })
}

/// Standardization followed by the three domain derivations.
pub fn run_pipeline(args: &RunArgs) -> Result<RunSummary> {
    let std_dir = args.out_dir.join("standardised");
    let final_dir = args.out_dir.join("final");
    fs::create_dir_all(&std_dir).with_context(|| format!("create {}", std_dir.display()))?;
    fs::create_dir_all(&final_dir).with_context(|| format!("create {}", final_dir.display()))?;

    info!(path = %args.withdrawn_file.display(), "loading withdrawal list");
    let withdrawals =
        WithdrawalSet::load(&args.withdrawn_file).context("load withdrawal list")?;
    info!(withdrawn = withdrawals.len(), "consent filter ready");

    info!("standardizing raw extracts");
    let standardized = standardize_all(&args.raw_dir, &withdrawals, &std_dir)
        .context("standardize raw extracts")?;

    info!("deriving primary-care tables");
    let today = Utc::now().date_naive();
    let mut canonical =
        derive_gp(&std_dir, &final_dir, today).context("derive primary-care tables")?;

    info!("deriving hospital tables");
    canonical.extend(derive_hospital(&std_dir, &final_dir).context("derive hospital tables")?);

    info!("deriving mortality tables");
    canonical.extend(derive_death(&std_dir, &final_dir).context("derive mortality tables")?);

    let summary = RunSummary {
        standardized: standardized
            .into_iter()
            .map(|(table, rows)| TableCount {
                table: table.table_name().to_string(),
                rows,
            })
            .collect(),
        canonical: canonical
            .into_iter()
            .map(|table| TableCount {
                table: table.name.to_string(),
                rows: table.rows,
            })
            .collect(),
    };
    write_summary(&args.out_dir, &summary)?;
    Ok(summary)
}

fn write_summary(out_dir: &Path, summary: &RunSummary) -> Result<()> {
    let path = out_dir.join("run_summary.json");
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote run summary");
    Ok(())
}

/// Prints the raw-table registry and the canonical output tables.
pub fn print_tables() {
    let mut raw = Table::new();
    raw.set_header(["raw table", "file", "columns"]);
    for table in RawTable::ALL {
        let columns: Vec<&str> = table.descriptor().column_names().collect();
        raw.add_row([
            table.table_name().to_string(),
            table.file_name().to_string(),
            columns.join(", "),
        ]);
    }
    println!("{raw}");

    let mut canonical = Table::new();
    canonical.set_header(["canonical table", "domain"]);
    for source in HospitalSource::ALL {
        canonical.add_row([source.file_name(), "hospital"]);
    }
    for source in GpSource::ALL {
        canonical.add_row([source.file_name(), "primary care"]);
    }
    canonical.add_row(["gp_medications.parquet", "primary care"]);
    for level in DeathLevel::ALL {
        canonical.add_row([level.file_name(), "mortality"]);
    }
    println!("{canonical}");
}
