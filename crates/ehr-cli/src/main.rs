//! EHR pipeline CLI.

use clap::Parser;

use ehr_cli::cli::{Cli, Command};
use ehr_cli::commands::{print_tables, run};
use ehr_cli::logging::{LogConfig, init_logging};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        ..LogConfig::default()
    };
    init_logging(&config);

    let exit_code = match cli.command {
        Command::Run(args) => match run(&args) {
            Ok(summary) => {
                for entry in &summary.canonical {
                    println!("{}: {} rows", entry.table, entry.rows);
                }
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Tables => {
            print_tables();
            0
        }
    };
    std::process::exit(exit_code);
}
