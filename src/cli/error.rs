//! CLI error type

use std::path::{Path, PathBuf};

use schema_explorer::explore::ExploreError;
use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {path}: {message}")]
    ReadFile { path: PathBuf, message: String },

    #[error("Failed to write {path}: {message}")]
    WriteFile { path: PathBuf, message: String },

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Explore(#[from] ExploreError),
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

/// Read a file into a string, tagging failures with the path
pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::ReadFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
