//! Import command handler

use crate::cli::error::CliError;
use crate::config::{ImporterConfig, RamlSection};
use crate::import::CollectionImporter;
use crate::models::Collection;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

/// Input source for import operations
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// `-` reads standard input, anything else is a file path
    pub fn parse(input: &str) -> Self {
        if input == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(input))
        }
    }
}

/// Arguments for the import command
#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub input: InputSource,
    pub output: Option<PathBuf>,
    pub pretty: bool,
    pub config: Option<PathBuf>,
    /// RAML keys to leave out, on top of the configured ones
    pub exclude_raml_keywords: Vec<String>,
    /// Also leave out the standard RAML structural keywords
    pub standard_exclusions: bool,
    pub validate: bool,
}

/// Resolve the importer configuration for a run.
///
/// An explicit `--config` file wins. Otherwise `.collection-import.toml` is
/// looked up next to the input file, then in the working directory.
pub fn load_config(args: &ImportArgs) -> Result<ImporterConfig, CliError> {
    let mut config = match &args.config {
        Some(path) if !path.exists() => return Err(CliError::FileNotFound(path.clone())),
        Some(path) => ImporterConfig::load_file(path)?,
        None => ImporterConfig::load(config_dir(&args.input))?,
    };

    if args.standard_exclusions {
        config.raml.excluded_keys.extend(RamlSection::standard_exclusions());
    }
    config
        .raml
        .excluded_keys
        .extend(args.exclude_raml_keywords.iter().cloned());
    Ok(config)
}

fn config_dir(input: &InputSource) -> &Path {
    match input {
        InputSource::File(path) => path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new(".")),
        InputSource::Stdin => Path::new("."),
    }
}

/// Serialize a collection as JSON
pub fn render_collection(collection: &Collection, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(collection)?
    } else {
        serde_json::to_string(collection)?
    };
    Ok(json)
}

/// Handle the import command
pub async fn handle_import(args: &ImportArgs) -> Result<(), CliError> {
    let config = load_config(args)?;
    let mut importer = CollectionImporter::new().with_config(config);
    if !args.validate {
        importer = importer.without_validation();
    }

    let collection = match &args.input {
        InputSource::File(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.clone()));
            }
            importer.import_file(path).await?
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
            importer.import_str(&buffer, None)?
        }
    };

    let json = render_collection(&collection, args.pretty)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
            info!(
                "Wrote collection '{}' to {}",
                collection.name,
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
