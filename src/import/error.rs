//! Import error types
//!
//! Every failure of an import surfaces as a single [`ImportError`]. It names
//! the pipeline stage that failed and keeps the underlying
//! [`ConversionError`] as its source, so callers can walk the cause chain.

use crate::validation::CollectionValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source document formats the importer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Raml,
    OpenApi,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Raml => write!(f, "RAML"),
            SourceFormat::OpenApi => write!(f, "OpenAPI"),
        }
    }
}

/// Pipeline stage at which an import failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportStage {
    /// Reading the document source
    Read,
    /// Parsing YAML/JSON text into a document tree
    Parse,
    /// Recognizing the document format
    Detect,
    /// Converting the document tree into collection items
    Convert,
    /// Running the post-processing pipeline
    PostProcess,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStage::Read => write!(f, "read"),
            ImportStage::Parse => write!(f, "parse"),
            ImportStage::Detect => write!(f, "detect"),
            ImportStage::Convert => write!(f, "convert"),
            ImportStage::PostProcess => write!(f, "post-process"),
        }
    }
}

/// Cause of an import failure
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid YAML/JSON: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("Unrecognized document format: {0}")]
    UnknownFormat(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Unexpected document shape at {path}: {reason}")]
    InvalidStructure { path: String, reason: String },

    #[error("Collection validation failed: {0}")]
    ValidationError(#[from] CollectionValidationError),

    #[error("Post-processor '{name}' failed: {reason}")]
    PostProcessorError { name: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ConversionError {
    /// Structural error at a document location
    pub fn structure(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ConversionError::InvalidStructure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Error returned by every importer entry point
#[derive(Debug, thiserror::Error)]
#[error("{}", display_message(.stage, .format))]
pub struct ImportError {
    /// Stage that failed
    pub stage: ImportStage,
    /// Format of the document, when it was known at the time of failure
    pub format: Option<SourceFormat>,
    /// Underlying cause
    #[source]
    pub source: ConversionError,
}

impl ImportError {
    pub fn new(
        stage: ImportStage,
        format: Option<SourceFormat>,
        source: ConversionError,
    ) -> Self {
        ImportError {
            stage,
            format,
            source,
        }
    }
}

fn display_message(stage: &ImportStage, format: &Option<SourceFormat>) -> String {
    match (stage, format) {
        (ImportStage::Parse, Some(format)) => {
            format!("An error occurred while parsing the {} collection", format)
        }
        (ImportStage::Parse, None) => {
            "An error occurred while parsing the API collection".to_string()
        }
        _ => "Import collection failed".to_string(),
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
