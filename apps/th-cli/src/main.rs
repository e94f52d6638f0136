use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use th_core::timing::{self, oracle_timing};
use th_fluids::{default_oracle, filter_fluid_catalog, fluid_catalog};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod case;
mod error;
mod report;

use error::CliResult;

#[derive(Parser)]
#[command(name = "th-cli")]
#[command(about = "thermostate CLI - fluid, mixture and humid air state calculations", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG applies otherwise
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Print a breakdown of property oracle calls
    #[arg(long, global = true)]
    timing: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax, units and process applicability
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Evaluate a case and print its state points
    Run {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Report format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List known fluids, optionally filtered by name or alias
    Fluids {
        /// Case-insensitive search text
        query: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.timing {
        timing::enable_timing();
    }

    let result = match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run {
            case_path,
            format,
            output,
        } => cmd_run(&case_path, format, output.as_deref()),
        Commands::Fluids { query } => {
            cmd_fluids(query.as_deref());
            Ok(())
        }
    };

    oracle_timing::print_summary();
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = case::load_case(case_path)?;
    println!(
        "✓ Case '{}' is valid: {}, {} process step(s)",
        case.name,
        case.medium.describe(),
        case.medium.step_count()
    );
    Ok(())
}

fn cmd_run(case_path: &Path, format: Format, output: Option<&Path>) -> CliResult<()> {
    let case = case::load_case(case_path)?;
    let report = report::run_case(&case, default_oracle())?;
    let rendered = match format {
        Format::Text => report::render_text(&report),
        Format::Json => report::render_json(&report)?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn cmd_fluids(query: Option<&str>) {
    let fluids = match query {
        Some(q) => filter_fluid_catalog(q),
        None => fluid_catalog().to_vec(),
    };
    if fluids.is_empty() {
        println!("No fluids match");
        return;
    }
    for info in fluids {
        let kind = if info.pure {
            "pure".to_string()
        } else {
            format!(
                "solution, fraction {}..{}",
                info.fraction_min, info.fraction_max
            )
        };
        println!(
            "  {:<24} {:<14} {}::{} ({kind})",
            info.display_name, info.coolprop_name, info.backend, info.coolprop_name
        );
    }
}
