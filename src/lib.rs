//! Collection Import SDK - Converts API descriptions into request collections
//!
//! Provides:
//! - RAML and OpenAPI v3 import into one normalized collection model
//! - Internal `$ref` resolution and JSON body scaffolding
//! - Security scheme to auth mapping
//! - Structural validation of produced collections
//! - File based importer configuration

pub mod config;
pub mod import;
pub mod models;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{ConfigError, ImporterConfig};
pub use import::{
    CollectionImporter, CollectionPostProcessor, ConversionError, DocumentSource, FormatAdapter,
    ImportError, ImportResult, ImportStage, InMemorySource, SourceDocument, SourceFormat,
};
#[cfg(feature = "native-fs")]
pub use import::FileSource;
pub use validation::{CollectionValidationError, CollectionValidationResult, CollectionValidator};

// Re-export models
pub use models::enums::*;
pub use models::{Auth, Body, Collection, Field, FolderItem, Item, Request, RequestItem, Var};
