//! CLI binary entry point for collection-import

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use collection_import_sdk::cli::commands::import::{ImportArgs, InputSource, handle_import};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "collection-import")]
#[command(about = "Convert RAML and OpenAPI v3 documents into request collections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Import a RAML or OpenAPI v3 document
    Import {
        /// Input file (.raml, .yaml or .yml) or '-' for stdin
        input: String,
        /// Write the collection to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the collection JSON
        #[arg(short, long)]
        pretty: bool,
        /// Configuration file (defaults to .collection-import.toml next to the input)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// RAML key to leave out of the conversion (repeatable)
        #[arg(long = "exclude-raml-keyword", value_name = "KEY")]
        exclude_raml_keywords: Vec<String>,
        /// Leave out the standard RAML structural keywords
        #[arg(long)]
        standard_exclusions: bool,
        /// Skip collection validation
        #[arg(long)]
        no_validate: bool,
    },
}

#[cfg(feature = "cli")]
async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Import {
            input,
            output,
            pretty,
            config,
            exclude_raml_keywords,
            standard_exclusions,
            no_validate,
        } => {
            let args = ImportArgs {
                input: InputSource::parse(&input),
                output,
                pretty,
                config,
                exclude_raml_keywords,
                standard_exclusions,
                validate: !no_validate,
            };
            handle_import(&args)
                .await
                .with_context(|| format!("Failed to import {}", input))
        }
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    // stdout carries the collection, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collection_import_sdk=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
