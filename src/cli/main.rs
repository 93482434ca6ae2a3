//! schema-explorer CLI
//!
//! Explores a directory-backed register and applies approved suggestions.

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::apply::{ApplyArgs, handle_apply};
use commands::explore::{ExploreArgs, handle_explore};

/// Discover undeclared properties and constraint drift in soft-schema records
#[derive(Parser)]
#[command(name = "schema-explorer")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore the records of a schema and print a report
    Explore {
        /// Store directory containing schemas/ and records/
        #[arg(short, long, value_name = "DIR")]
        store: PathBuf,

        /// Schema id
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "summary")]
        format: OutputFormat,

        /// Explorer configuration file (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Merge approved property definitions into a schema
    Apply {
        /// Store directory containing schemas/ and records/
        #[arg(short, long, value_name = "DIR")]
        store: PathBuf,

        /// Schema id
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// JSON object mapping property names to definitions
        #[arg(long, value_name = "FILE", conflicts_with = "report")]
        updates: Option<PathBuf>,

        /// Saved JSON report to take suggested definitions from
        #[arg(long, value_name = "FILE", requires = "approve")]
        report: Option<PathBuf>,

        /// Property names approved from the report
        #[arg(long, value_delimiter = ',')]
        approve: Vec<String>,
    },
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Explore {
            store,
            schema,
            format,
            config,
            output,
        } => {
            let args = ExploreArgs {
                store,
                schema,
                format,
                config,
                output,
            };
            handle_explore(&args)
                .with_context(|| format!("exploring schema '{}' failed", args.schema))
        }
        Commands::Apply {
            store,
            schema,
            updates,
            report,
            approve,
        } => {
            let args = ApplyArgs {
                store,
                schema,
                updates,
                report,
                approve,
            };
            handle_apply(&args)
                .with_context(|| format!("applying suggestions to '{}' failed", args.schema))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
