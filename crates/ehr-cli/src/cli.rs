//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Debug, Parser)]
#[command(
    name = "ehr",
    version,
    about = "Standardize raw clinical extracts and derive canonical event tables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    #[command(flatten)]
    pub color: colorchoice_clap::Color,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: standardization, then all three derivations.
    Run(RunArgs),
    /// List the raw-table registry and the canonical output tables.
    Tables,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory where the raw extract files are stored.
    #[arg(long)]
    pub raw_dir: PathBuf,

    /// Single-column file with withdrawn subject identifiers.
    #[arg(long)]
    pub withdrawn_file: PathBuf,

    /// Output directory; standardized and final tables are written to
    /// `standardised/` and `final/` beneath it.
    #[arg(long)]
    pub out_dir: PathBuf,
}
