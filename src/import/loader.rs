//! Document loading
//!
//! Reads API description text from a [`DocumentSource`], parses it as YAML
//! (which also accepts JSON) and converts the result into an ordered
//! `serde_json::Value` tree that the format adapters walk.
//!
//! The `!include` tag is kept as an opaque placeholder string. Included files
//! are never read.

use super::error::{ConversionError, SourceFormat};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use std::path::Path;
use tracing::debug;

/// File extensions accepted for import
pub const SUPPORTED_EXTENSIONS: &[&str] = &["raml", "yaml", "yml"];

/// Media types accepted for import
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["application/yaml", "application/x-yaml"];

/// Tag marking a file inclusion in RAML documents
pub const INCLUDE_TAG: &str = "include";

/// Header line that opens every RAML document
const RAML_HEADER: &str = "#%RAML";

// An `openapi` key at the top of a YAML document or in a JSON object
static RE_OPENAPI_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^(?:openapi|[\s{]*"openapi"|'openapi')\s*:"#).expect("Invalid regex")
});

/// Raw text of a document plus what is known about where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub text: String,
    pub file_name: Option<String>,
    pub media_type: Option<String>,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        SourceDocument {
            text: text.into(),
            file_name: None,
            media_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// Somewhere a document can be read from.
///
/// Reading is the only step of an import that may suspend.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn read(&self) -> Result<SourceDocument, ConversionError>;
}

/// Document held in memory, for example an upload already received
#[derive(Debug, Clone)]
pub struct InMemorySource {
    document: SourceDocument,
}

impl InMemorySource {
    pub fn new(document: SourceDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl DocumentSource for InMemorySource {
    async fn read(&self) -> Result<SourceDocument, ConversionError> {
        Ok(self.document.clone())
    }
}

/// Document stored on the local file system
#[cfg(feature = "native-fs")]
#[derive(Debug, Clone)]
pub struct FileSource {
    path: std::path::PathBuf,
}

#[cfg(feature = "native-fs")]
impl FileSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(feature = "native-fs")]
#[async_trait]
impl DocumentSource for FileSource {
    async fn read(&self) -> Result<SourceDocument, ConversionError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let mut document = SourceDocument::new(text);
        if let Some(name) = self.path.file_name().and_then(|n| n.to_str()) {
            document = document.with_file_name(name);
        }
        Ok(document)
    }
}

/// Check the file name and media type of a document against the accepted set.
///
/// Unknown values are not checked.
pub fn check_file_type(document: &SourceDocument) -> Result<(), ConversionError> {
    if let Some(name) = &document.file_name {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let accepted = extension
            .as_deref()
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e));
        if !accepted {
            return Err(ConversionError::UnsupportedFile(format!(
                "'{}' must have one of the extensions: {}",
                name,
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }
    }

    if let Some(media_type) = &document.media_type {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        if !SUPPORTED_MEDIA_TYPES
            .iter()
            .any(|m| m.eq_ignore_ascii_case(essence))
        {
            return Err(ConversionError::UnsupportedFile(format!(
                "media type '{}' is not one of: {}",
                media_type,
                SUPPORTED_MEDIA_TYPES.join(", ")
            )));
        }
    }

    Ok(())
}

/// Parse YAML or JSON text into an ordered document tree.
///
/// Merge keys (`<<`) are applied. Mapping keys that are not strings are
/// stringified.
///
/// # Example
///
/// ```rust
/// use collection_import_sdk::import::loader::parse_document;
///
/// let doc = parse_document("title: Pets\nschema: !include pet.json\n").unwrap();
/// assert_eq!(doc["title"], "Pets");
/// assert_eq!(doc["schema"], "!include pet.json");
/// ```
pub fn parse_document(text: &str) -> Result<Value, ConversionError> {
    let mut yaml: YamlValue = serde_yaml::from_str(text)?;
    yaml.apply_merge()?;
    Ok(yaml_to_json(yaml))
}

/// Format suggested by the raw text or file name, before parsing.
///
/// Only used to word parse failures; [`detect_format`] decides the format.
pub fn format_hint(text: &str, file_name: Option<&str>) -> Option<SourceFormat> {
    if text.trim_start().starts_with(RAML_HEADER) || has_raml_extension(file_name) {
        Some(SourceFormat::Raml)
    } else if RE_OPENAPI_KEY.is_match(text) {
        Some(SourceFormat::OpenApi)
    } else {
        None
    }
}

fn has_raml_extension(file_name: Option<&str>) -> bool {
    file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("raml"))
}

/// Recognize the format of a parsed document.
pub fn detect_format(
    text: &str,
    document: &Value,
    file_name: Option<&str>,
) -> Result<SourceFormat, ConversionError> {
    if text.trim_start().starts_with(RAML_HEADER) {
        return Ok(SourceFormat::Raml);
    }

    let Some(root) = document.as_object() else {
        return Err(ConversionError::UnknownFormat(
            "document is empty or not a mapping".to_string(),
        ));
    };

    if let Some(version) = root.get("openapi") {
        let version = scalar_to_string(version).unwrap_or_default();
        if version.starts_with('3') {
            return Ok(SourceFormat::OpenApi);
        }
        return Err(ConversionError::UnsupportedFormat(format!(
            "OpenAPI version '{}'",
            version
        )));
    }

    if root.contains_key("swagger") {
        return Err(ConversionError::UnsupportedFormat(
            "Swagger 2.0 documents".to_string(),
        ));
    }

    if has_raml_extension(file_name) {
        debug!("No RAML header found, using the .raml file extension");
        return Ok(SourceFormat::Raml);
    }

    Err(ConversionError::UnknownFormat(
        "expected a '#%RAML' header or an 'openapi' version key".to_string(),
    ))
}

/// Render a scalar node as text. Mappings and sequences yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn yaml_to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => yaml_number_to_json(&n),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key_to_string(&key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            if tag.trim_start_matches('!') == INCLUDE_TAG {
                let target = match yaml_to_json(tagged.value) {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Value::String(format!("!{} {}", INCLUDE_TAG, target).trim_end().to_string())
            } else {
                debug!("Ignoring unknown YAML tag {}", tag);
                yaml_to_json(tagged.value)
            }
        }
    }
}

fn yaml_number_to_json(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            // NaN and infinities have no JSON number form
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

fn yaml_key_to_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_preserves_key_order() {
        let doc = parse_document("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
        let keys: Vec<&str> = doc.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_json_content() {
        let doc = parse_document(r#"{"openapi": "3.0.0", "paths": {}}"#).unwrap();
        assert_eq!(doc["openapi"], json!("3.0.0"));
        assert_eq!(doc["paths"], json!({}));
    }

    #[test]
    fn test_include_tag_is_placeholder() {
        let doc = parse_document("types:\n  Pet: !include types/pet.raml\n").unwrap();
        assert_eq!(doc["types"]["Pet"], json!("!include types/pet.raml"));
    }

    #[test]
    fn test_unknown_tag_keeps_inner_value() {
        let doc = parse_document("kind: !custom pet\n").unwrap();
        assert_eq!(doc["kind"], json!("pet"));
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let doc = parse_document("responses:\n  200:\n    description: ok\n  true: yes\n").unwrap();
        assert_eq!(doc["responses"]["200"]["description"], json!("ok"));
        assert_eq!(doc["responses"]["true"], json!("yes"));
    }

    #[test]
    fn test_merge_keys_are_applied() {
        let text = "base: &base\n  type: string\nfield:\n  <<: *base\n  required: true\n";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc["field"], json!({ "type": "string", "required": true }));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let result = parse_document("a: [unclosed\n  b: c");
        assert!(matches!(result, Err(ConversionError::YamlError(_))));
    }

    #[test]
    fn test_detect_formats() {
        let raml = "#%RAML 1.0\ntitle: Pets\n";
        let doc = parse_document(raml).unwrap();
        assert_eq!(detect_format(raml, &doc, None).unwrap(), SourceFormat::Raml);

        let oas = "openapi: 3.0.3\ninfo:\n  title: Pets\n";
        let doc = parse_document(oas).unwrap();
        assert_eq!(detect_format(oas, &doc, None).unwrap(), SourceFormat::OpenApi);

        let headerless = "title: Pets\n/pets:\n  get: {}\n";
        let doc = parse_document(headerless).unwrap();
        assert_eq!(
            detect_format(headerless, &doc, Some("api.raml")).unwrap(),
            SourceFormat::Raml
        );
        assert!(matches!(
            detect_format(headerless, &doc, Some("api.yaml")),
            Err(ConversionError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_detect_rejects_swagger_and_empty() {
        let swagger = "swagger: '2.0'\n";
        let doc = parse_document(swagger).unwrap();
        assert!(matches!(
            detect_format(swagger, &doc, None),
            Err(ConversionError::UnsupportedFormat(_))
        ));

        let doc = parse_document("").unwrap();
        assert!(matches!(
            detect_format("", &doc, None),
            Err(ConversionError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_format_hint() {
        assert_eq!(format_hint("#%RAML 1.0\n", None), Some(SourceFormat::Raml));
        assert_eq!(format_hint("a: [", Some("api.raml")), Some(SourceFormat::Raml));
        assert_eq!(format_hint("openapi: [3", None), Some(SourceFormat::OpenApi));
        assert_eq!(format_hint("a: [", Some("api.yaml")), None);
        assert_eq!(
            format_hint("{\n  \"openapi\": \"3.0.0\",\n  \"paths\": [", None),
            Some(SourceFormat::OpenApi)
        );
        assert_eq!(format_hint("'openapi': 3.0.0\n[", None), Some(SourceFormat::OpenApi));
    }

    #[test]
    fn test_format_hint_ignores_openapi_in_values() {
        let text = "title: Pets\ndescription: Ported from openapi: the old spec\n/pets: [\n";
        assert_eq!(format_hint(text, None), None);
        assert_eq!(format_hint("info:\n  openapi: nested\n[", None), None);
    }

    #[test]
    fn test_check_file_type() {
        let ok = SourceDocument::new("").with_file_name("api.YML");
        assert!(check_file_type(&ok).is_ok());

        let json = SourceDocument::new("").with_file_name("api.json");
        assert!(matches!(
            check_file_type(&json),
            Err(ConversionError::UnsupportedFile(_))
        ));

        let media = SourceDocument::new("").with_media_type("application/x-yaml; charset=utf-8");
        assert!(check_file_type(&media).is_ok());

        let bad_media = SourceDocument::new("").with_media_type("text/html");
        assert!(check_file_type(&bad_media).is_err());
    }
}
