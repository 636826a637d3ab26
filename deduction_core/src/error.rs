//! Error types for the deduction core.
//!
//! Evaluation operations never return these: their failures are folded into
//! `Unexpected` results. They surface from setup work such as loading
//! configuration, building the HTTP client or indexing a discovered clue.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::vector_index::IndexError;

/// Main error type for deduction core operations
#[derive(Error, Debug)]
pub enum DeductionError {
    /// Model gateway request failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Vector index rejected an insertion
    #[error("Vector index error: {0}")]
    Index(#[from] IndexError),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Case content could not be loaded
    #[error("Case file error: {0}")]
    CaseFile(#[from] case_rules::CaseFileError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for deduction core operations
pub type Result<T> = std::result::Result<T, DeductionError>;
