//! CLI command for exploring a schema

use std::path::{Path, PathBuf};

use schema_explorer::explore::{ExplorerConfig, SchemaExplorer};
use schema_explorer::storage::FileSystemBackend;

use crate::OutputFormat;
use crate::error::{CliError, read_file};
use crate::output::render_report;

/// Arguments for the `explore` command
pub struct ExploreArgs {
    /// Store directory
    pub store: PathBuf,
    /// Schema id
    pub schema: String,
    /// Output format
    pub format: OutputFormat,
    /// Optional TOML configuration file
    pub config: Option<PathBuf>,
    /// Output file path (stdout if not provided)
    pub output: Option<PathBuf>,
}

/// Load explorer configuration, falling back to defaults
pub fn load_config(path: Option<&Path>) -> Result<ExplorerConfig, CliError> {
    let Some(path) = path else {
        return Ok(ExplorerConfig::default());
    };
    let content = read_file(path)?;
    toml::from_str(&content).map_err(|e| CliError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Handle the `explore` command
pub fn handle_explore(args: &ExploreArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let explorer = SchemaExplorer::with_config(FileSystemBackend::new(&args.store), config);

    eprintln!("Exploring schema '{}' in {}", args.schema, args.store.display());
    let report = explorer.explore(&args.schema)?;
    eprintln!(
        "  {} records, {} suggestion(s)",
        report.total_records, report.summary.total
    );

    let rendered = render_report(&report, args.format)?;
    if let Some(ref output_path) = args.output {
        std::fs::write(output_path, &rendered).map_err(|e| CliError::WriteFile {
            path: output_path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Report written to: {}", output_path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}
