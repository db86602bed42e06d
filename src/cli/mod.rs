//! Command line interface for the collection importer

pub mod commands;
pub mod error;

pub use error::CliError;
