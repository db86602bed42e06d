//! Import functionality
//!
//! Converts API description documents into a normalized [`Collection`]:
//! - RAML resource trees ([`raml`])
//! - OpenAPI v3 documents ([`openapi`])
//!
//! The pipeline reads the document, parses it into an ordered tree, detects
//! its format, hands it to the matching [`FormatAdapter`] and finally runs the
//! registered [`CollectionPostProcessor`]s. Any failure ends the import with a
//! single [`ImportError`].

pub mod auth;
pub mod error;
pub mod loader;
pub mod openapi;
pub mod raml;
pub mod refs;
pub mod request;
pub mod schema;
pub mod tags;

pub use error::{ConversionError, ImportError, ImportResult, ImportStage, SourceFormat};
#[cfg(feature = "native-fs")]
pub use loader::FileSource;
pub use loader::{DocumentSource, InMemorySource, SourceDocument};
pub use openapi::OpenApiImporter;
pub use raml::RamlImporter;

use crate::config::ImporterConfig;
use crate::models::{Collection, Item};
use crate::validation::CollectionValidator;
use serde_json::Value;
use tracing::{debug, error, info};

/// A source format converted into collection items
pub trait FormatAdapter {
    fn format(&self) -> SourceFormat;

    /// Collection name taken from the document, `""` when absent
    fn collection_name(&self, document: &Value) -> String;

    /// Convert the parsed document into the top-level items of a collection
    fn convert(&self, document: &Value) -> Result<Vec<Item>, ConversionError>;
}

/// A step run on the assembled collection before it is returned
pub trait CollectionPostProcessor: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    fn process(&self, collection: Collection) -> Result<Collection, ConversionError>;
}

/// Entry point for collection imports
///
/// # Example
///
/// ```rust
/// use collection_import_sdk::import::CollectionImporter;
///
/// let raml = "#%RAML 1.0\ntitle: Pets\n/pets:\n  get: {}\n";
/// let collection = CollectionImporter::new().import_str(raml, Some("pets.raml")).unwrap();
/// assert_eq!(collection.name, "Pets");
/// assert_eq!(collection.items[0].name(), "pets");
/// ```
pub struct CollectionImporter {
    config: ImporterConfig,
    post_processors: Vec<Box<dyn CollectionPostProcessor>>,
    validate: bool,
}

impl Default for CollectionImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionImporter {
    /// Create an importer with the default configuration and validation enabled
    pub fn new() -> Self {
        Self {
            config: ImporterConfig::default(),
            post_processors: Vec::new(),
            validate: true,
        }
    }

    pub fn with_config(mut self, config: ImporterConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a post-processor. Post-processors run in registration order,
    /// before the built-in validator.
    pub fn with_post_processor(
        mut self,
        processor: impl CollectionPostProcessor + 'static,
    ) -> Self {
        self.post_processors.push(Box::new(processor));
        self
    }

    /// Skip the built-in collection validator
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Import document text.
    ///
    /// # Arguments
    ///
    /// * `content` - RAML or OpenAPI v3 text, YAML or JSON.
    /// * `file_name` - Name of the file the text came from, if known. Its
    ///   extension must be one of `.raml`, `.yaml` or `.yml`.
    pub fn import_str(&self, content: &str, file_name: Option<&str>) -> ImportResult<Collection> {
        let mut document = SourceDocument::new(content);
        if let Some(name) = file_name {
            document = document.with_file_name(name);
        }
        self.import_document(document)
    }

    /// Read a document from `source` and import it
    pub async fn import_source(&self, source: &impl DocumentSource) -> ImportResult<Collection> {
        let document = source
            .read()
            .await
            .map_err(|e| fail(ImportStage::Read, None, e))?;
        self.import_document(document)
    }

    /// Read a file from the local file system and import it
    #[cfg(feature = "native-fs")]
    pub async fn import_file(&self, path: impl AsRef<std::path::Path>) -> ImportResult<Collection> {
        self.import_source(&FileSource::new(path.as_ref())).await
    }

    /// Import a document that has already been read
    pub fn import_document(&self, document: SourceDocument) -> ImportResult<Collection> {
        loader::check_file_type(&document).map_err(|e| fail(ImportStage::Read, None, e))?;

        let file_name = document.file_name.as_deref();
        let tree = loader::parse_document(&document.text).map_err(|e| {
            fail(
                ImportStage::Parse,
                loader::format_hint(&document.text, file_name),
                e,
            )
        })?;
        let format = loader::detect_format(&document.text, &tree, file_name)
            .map_err(|e| fail(ImportStage::Detect, None, e))?;
        info!(
            "Importing {} document {}",
            format,
            file_name.unwrap_or("<in-memory>")
        );

        let collection = match format {
            SourceFormat::Raml => assemble(&RamlImporter::new(&self.config.raml), &tree),
            SourceFormat::OpenApi => assemble(&OpenApiImporter::new(&self.config), &tree),
        }
        .map_err(|e| fail(ImportStage::Convert, Some(format), e))?;

        let collection = self
            .post_process(collection)
            .map_err(|e| fail(ImportStage::PostProcess, Some(format), e))?;
        info!(
            "Imported collection '{}' with {} requests",
            collection.name,
            collection.requests().len()
        );
        Ok(collection)
    }

    fn post_process(&self, mut collection: Collection) -> Result<Collection, ConversionError> {
        for processor in &self.post_processors {
            collection = processor.process(collection)?;
        }
        if self.validate {
            collection = CollectionValidator::new().process(collection)?;
        }
        Ok(collection)
    }
}

/// Wrap the adapter's items in the collection envelope
fn assemble(adapter: &impl FormatAdapter, document: &Value) -> Result<Collection, ConversionError> {
    debug!("Converting {} document", adapter.format());
    let items = adapter.convert(document)?;
    Ok(Collection::new(adapter.collection_name(document), items))
}

fn fail(stage: ImportStage, format: Option<SourceFormat>, source: ConversionError) -> ImportError {
    error!("Import failed at the {} stage: {}", stage, source);
    ImportError::new(stage, format, source)
}
