//! RAML importer
//!
//! Walks a RAML resource tree and converts it into folders and requests:
//! - keys naming an HTTP method (any case) become requests
//! - keys starting with `/` become folders, walked recursively with the
//!   accumulated resource path
//! - every other key yields nothing
//!
//! Structural keywords (`types`, `traits`, `uriParameters`, ...) are only
//! skipped when listed in [`RamlSection::excluded_keys`]; by default every key
//! is considered. Resource types, traits and `!include` targets are not
//! expanded.

use super::FormatAdapter;
use super::error::{ConversionError, SourceFormat};
use super::loader::scalar_to_string;
use super::request::{
    BASE_URI_VARIABLE, RequestItemBuilder, escape_path_templates, select_media_type,
};
use crate::config::RamlSection;
use crate::models::{Body, BodyMode, Field, FolderItem, HttpMethod, Item};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Location of the node being walked
#[derive(Debug, Clone)]
struct WalkContext<'a> {
    base_uri: &'a str,
    default_media_type: &'a str,
    /// Resource path as written in the document, for request names
    raw_path: String,
    /// Resource path with templates doubled, for request URLs
    url_path: String,
}

impl WalkContext<'_> {
    fn nested(&self, resource_key: &str) -> Self {
        WalkContext {
            raw_path: format!("{}{}", self.raw_path, resource_key),
            url_path: format!("{}{}", self.url_path, escape_path_templates(resource_key)),
            ..self.clone()
        }
    }
}

/// RAML format adapter
#[derive(Debug, Clone)]
pub struct RamlImporter<'a> {
    config: &'a RamlSection,
}

impl<'a> RamlImporter<'a> {
    pub fn new(config: &'a RamlSection) -> Self {
        Self { config }
    }

    fn walk(
        &self,
        node: &Map<String, Value>,
        context: &WalkContext,
    ) -> Result<Vec<Item>, ConversionError> {
        let mut items = Vec::new();
        for (key, value) in node {
            if self.config.is_excluded(key) {
                debug!("Skipping excluded RAML key '{}'", key);
                continue;
            }
            if let Some(method) = HttpMethod::from_key(key) {
                items.push(self.convert_method(method, value, context)?);
            } else if key.starts_with('/') {
                items.push(self.convert_resource(key, value, context)?);
            }
        }
        Ok(items)
    }

    fn convert_resource(
        &self,
        key: &str,
        value: &Value,
        context: &WalkContext,
    ) -> Result<Item, ConversionError> {
        let nested = context.nested(key);
        let items = match node_as_map(value, &nested.raw_path)? {
            Some(resource) => self.walk(resource, &nested)?,
            None => Vec::new(),
        };
        let name = key.strip_prefix('/').unwrap_or(key);
        Ok(Item::Folder(FolderItem::new(name, items)))
    }

    fn convert_method(
        &self,
        method: HttpMethod,
        value: &Value,
        context: &WalkContext,
    ) -> Result<Item, ConversionError> {
        let location = format!("{}/{}", context.raw_path, method.as_str().to_lowercase());
        let empty = Map::new();
        let operation = node_as_map(value, &location)?.unwrap_or(&empty);

        let display_path = if context.raw_path.is_empty() {
            "/"
        } else {
            context.raw_path.as_str()
        };
        let name = operation
            .get("displayName")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| format!("{} {}", method, display_path));
        let url = format!("{}{}", context.base_uri, context.url_path);

        let builder = RequestItemBuilder::new(name, method, &url)
            .params(declared_fields(operation.get("queryParameters"), false))
            .headers(declared_fields(operation.get("headers"), true))
            .body(self.convert_body(operation.get("body"), context.default_media_type))
            .docs(string_field(operation, "description"))
            .uri_vars_from_url();
        Ok(builder.build_item())
    }

    fn convert_body(&self, body: Option<&Value>, default_media_type: &str) -> Body {
        let Some(body_node) = body else {
            return Body::none();
        };
        let Some(declared) = body_node.as_object() else {
            return Body::none();
        };

        let (mode, payload) = match select_media_type(declared) {
            Some((_, mode, payload)) => (mode, payload),
            None => match BodyMode::from_mime(default_media_type) {
                Some(mode) => (mode, declared.get(default_media_type).unwrap_or(body_node)),
                None => {
                    debug!("No body mode for default media type {}", default_media_type);
                    return Body::none();
                }
            },
        };

        if mode.is_form() {
            let properties = payload
                .get("properties")
                .or_else(|| payload.get("formParameters"));
            Body::form(mode, declared_fields(properties, true))
        } else {
            Body::literal(mode, example_text(payload, mode))
        }
    }
}

impl FormatAdapter for RamlImporter<'_> {
    fn format(&self) -> SourceFormat {
        SourceFormat::Raml
    }

    fn collection_name(&self, document: &Value) -> String {
        document
            .get("title")
            .and_then(scalar_to_string)
            .unwrap_or_default()
    }

    fn convert(&self, document: &Value) -> Result<Vec<Item>, ConversionError> {
        let root = document
            .as_object()
            .ok_or_else(|| ConversionError::structure("/", "RAML document must be a mapping"))?;

        let literal_base = if self.config.literal_base_uri {
            root.get("baseUri")
                .and_then(Value::as_str)
                .map(|base_uri| literal_base_uri(base_uri, root.get("version")))
        } else {
            None
        };
        let default_media_type: &str = match root.get("mediaType") {
            Some(Value::String(media_type)) => media_type.as_str(),
            Some(Value::Array(media_types)) => media_types
                .iter()
                .find_map(Value::as_str)
                .unwrap_or(&self.config.default_media_type),
            _ => &self.config.default_media_type,
        };

        let context = WalkContext {
            base_uri: literal_base.as_deref().unwrap_or(BASE_URI_VARIABLE),
            default_media_type,
            raw_path: String::new(),
            url_path: String::new(),
        };
        let items = self.walk(root, &context)?;
        info!("Converted RAML document into {} top-level items", items.len());
        Ok(items)
    }
}

/// The document's `baseUri` with `{version}` filled from the `version` key
/// and any other templates doubled into variables.
fn literal_base_uri(base_uri: &str, version: Option<&Value>) -> String {
    let substituted = match version.and_then(scalar_to_string) {
        Some(version) => base_uri.replace("{version}", &version),
        None => base_uri.to_string(),
    };
    escape_path_templates(&substituted)
}

/// Interpret a resource or method node.
///
/// Null and string nodes (such as `!include` placeholders) have no content.
fn node_as_map<'v>(
    value: &'v Value,
    location: &str,
) -> Result<Option<&'v Map<String, Value>>, ConversionError> {
    match value {
        Value::Object(map) => Ok(Some(map)),
        Value::Null | Value::String(_) => Ok(None),
        _ => Err(ConversionError::structure(
            location,
            "expected a mapping, null or an !include placeholder",
        )),
    }
}

/// Fields for a `queryParameters`, `headers` or `properties` map.
///
/// `enabled` follows `required` (absent means optional); a trailing `?` on
/// the name also marks the field optional and is stripped.
fn declared_fields(declarations: Option<&Value>, value_from_example: bool) -> Vec<Field> {
    let Some(Value::Object(declarations)) = declarations else {
        return Vec::new();
    };

    declarations
        .iter()
        .map(|(name, declaration)| {
            let (name, optional) = match name.strip_suffix('?') {
                Some(stripped) => (stripped, true),
                None => (name.as_str(), false),
            };
            let required = !optional
                && declaration
                    .get("required")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
            let value = if value_from_example {
                declaration
                    .get("example")
                    .and_then(scalar_to_string)
                    .unwrap_or_default()
            } else {
                String::new()
            };
            let description = declaration
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Field::new(name, value, description, required)
        })
        .collect()
}

/// Literal body text from a declared `example`, or the first of `examples`.
fn example_text(payload: &Value, mode: BodyMode) -> String {
    let example = payload.get("example").or_else(|| {
        match payload.get("examples")? {
            Value::Object(named) => named
                .values()
                .next()
                .map(|entry| entry.get("value").unwrap_or(entry)),
            Value::Array(list) => list.first(),
            _ => None,
        }
    });

    match example {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) if mode == BodyMode::Json => {
            serde_json::to_string_pretty(other).unwrap_or_default()
        }
        Some(other) => other.to_string(),
    }
}

fn string_field(node: &Map<String, Value>, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
