use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PtvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid parameter file: {0}")]
    Parse(String),

    #[error("Parameter schema error: {0}")]
    Schema(String),

    #[error("Invalid legacy file {file}: {detail}")]
    LegacyParse { file: String, detail: String },

    #[error("Parameter set '{0}' already exists")]
    DuplicateName(String),

    #[error("Parameter set not found: {0}")]
    NotFound(String),

    #[error("Cannot delete the active parameter set '{0}'")]
    ActiveDeletion(String),

    #[error("Failed to load parameter set {}: {detail}", path.display())]
    Load { path: PathBuf, detail: String },
}

pub type Result<T> = std::result::Result<T, PtvError>;
