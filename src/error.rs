use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

// Clone is required because single-flight waiters share the winning
// builder's outcome, error included.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum AtlasError {
    #[error("invalid experiment accession: {0}")]
    InvalidAccession(String),

    #[error("invalid experiment type tag: {0}")]
    InvalidExperimentType(String),

    #[error("experiment not found: {0}")]
    ExperimentNotFound(String),

    #[error("experiment {accession} has unsupported type {experiment_type}")]
    UnsupportedExperimentType {
        accession: String,
        experiment_type: String,
    },

    #[error("failed to build experiment {accession}: {message}")]
    BuildFailure { accession: String, message: String },

    #[error("design parse failed: {0}")]
    DesignParse(String),

    #[error("investigation metadata parse failed: {0}")]
    InvestigationParse(String),

    #[error("technology type parse failed: {0}")]
    TechnologyTypeParse(String),

    #[error("record store lookup failed: {0}")]
    RecordStore(String),

    #[error("sample of {requested} requested from a pool of {available}")]
    SampleUnderflow { requested: usize, available: usize },

    #[error("index request failed: {0}")]
    IndexHttp(String),

    #[error("index returned status {status}: {message}")]
    IndexStatus { status: u16, message: String },

    #[error("admin request failed: {0}")]
    AdminHttp(String),

    #[error("admin endpoint returned status {status}: {message}")]
    AdminStatus { status: u16, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
