//! OpenAPI v3 importer
//!
//! Resolves local `$ref`s, flattens the path map into one descriptor per
//! operation and builds a request from each. Requests are then grouped into
//! folders by their first tag.

use super::FormatAdapter;
use super::auth::{AuthMapper, SecurityContext};
use super::error::{ConversionError, SourceFormat};
use super::loader::scalar_to_string;
use super::refs::resolve_document;
use super::request::{RequestItemBuilder, escape_path_templates, select_media_type};
use super::schema::flatten_schema;
use super::tags::TagGrouper;
use crate::config::ImporterConfig;
use crate::models::{Body, BodyMode, Field, HttpMethod, Item};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::{debug, info};

static RE_SERVER_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"));

/// Document-wide settings shared by every operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalContext {
    /// First server URL with its variables substituted, without trailing `/`
    pub base_url: String,
    pub security: SecurityContext,
}

impl GlobalContext {
    pub fn from_document(document: &Value) -> Self {
        Self {
            base_url: server_base_url(document),
            security: SecurityContext::from_document(document),
        }
    }
}

/// One method of one path, with everything needed to build its request
#[derive(Debug, Clone)]
pub struct OperationDescriptor<'d> {
    pub method: HttpMethod,
    pub path: &'d str,
    pub operation: &'d Map<String, Value>,
    /// Path-item parameters merged with the operation's own
    pub parameters: Vec<&'d Value>,
    pub global: &'d GlobalContext,
}

impl<'d> OperationDescriptor<'d> {
    /// Request name: `operationId`, `summary`, `description`, then `METHOD path`
    pub fn name(&self) -> String {
        ["operationId", "summary", "description"]
            .iter()
            .find_map(|key| {
                self.operation
                    .get(*key)
                    .and_then(scalar_to_string)
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or_else(|| format!("{} {}", self.method, self.path))
    }

    /// First tag of the operation, if any
    pub fn tag(&self) -> Option<&str> {
        self.operation
            .get("tags")
            .and_then(Value::as_array)
            .and_then(|tags| tags.first())
            .and_then(Value::as_str)
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.global.base_url,
            escape_path_templates(self.path)
        )
    }

    fn parameters_in(&self, location: &str) -> Vec<&'d Value> {
        self.parameters
            .iter()
            .copied()
            .filter(|p| p.get("in").and_then(Value::as_str) == Some(location))
            .collect()
    }
}

/// Substitute server variables into the first server URL
pub fn server_base_url(document: &Value) -> String {
    let Some(server) = document
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
    else {
        return String::new();
    };
    let url = server.get("url").and_then(Value::as_str).unwrap_or_default();
    let variables = server.get("variables");

    let substituted = RE_SERVER_VARIABLE.replace_all(url, |caps: &Captures| {
        variables
            .and_then(|vars| vars.get(&caps[1]))
            .and_then(|var| var.get("default"))
            .and_then(scalar_to_string)
            .unwrap_or_else(|| caps[0].to_string())
    });
    substituted.trim_end_matches('/').to_string()
}

/// List every operation of the path map in source order.
///
/// A `paths` value, path item or operation that is not a mapping is a
/// structural error.
pub fn extract_operations<'d>(
    document: &'d Value,
    global: &'d GlobalContext,
) -> Result<Vec<OperationDescriptor<'d>>, ConversionError> {
    let paths = match document.get("paths") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(paths)) => paths,
        Some(_) => return Err(ConversionError::structure("/paths", "expected a mapping")),
    };

    let mut descriptors = Vec::new();
    for (path, path_item) in paths {
        let path_item = path_item.as_object().ok_or_else(|| {
            ConversionError::structure(format!("/paths/{}", path), "path item must be a mapping")
        })?;
        let shared_parameters = parameter_list(path_item.get("parameters"));

        for (key, operation) in path_item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };
            let operation = operation.as_object().ok_or_else(|| {
                ConversionError::structure(
                    format!("/paths/{}/{}", path, key),
                    "operation must be a mapping",
                )
            })?;
            let parameters = merge_parameters(
                &shared_parameters,
                parameter_list(operation.get("parameters")),
            );
            descriptors.push(OperationDescriptor {
                method,
                path,
                operation,
                parameters,
                global,
            });
        }
    }
    Ok(descriptors)
}

fn parameter_list(parameters: Option<&Value>) -> Vec<&Value> {
    parameters
        .and_then(Value::as_array)
        .map(|list| list.iter().filter(|p| p.is_object()).collect())
        .unwrap_or_default()
}

fn parameter_key(parameter: &Value) -> (Option<&str>, Option<&str>) {
    (
        parameter.get("name").and_then(Value::as_str),
        parameter.get("in").and_then(Value::as_str),
    )
}

/// Operation parameters replace path-item parameters with the same name and location
fn merge_parameters<'d>(shared: &[&'d Value], own: Vec<&'d Value>) -> Vec<&'d Value> {
    let mut merged = shared.to_vec();
    for parameter in own {
        let key = parameter_key(parameter);
        match merged.iter_mut().find(|p| parameter_key(p) == key) {
            Some(existing) => *existing = parameter,
            None => merged.push(parameter),
        }
    }
    merged
}

/// OpenAPI v3 format adapter
#[derive(Debug, Clone)]
pub struct OpenApiImporter<'a> {
    config: &'a ImporterConfig,
}

impl<'a> OpenApiImporter<'a> {
    pub fn new(config: &'a ImporterConfig) -> Self {
        Self { config }
    }

    /// Build the request item for one operation
    pub fn build_request(&self, descriptor: &OperationDescriptor) -> Result<Item, ConversionError> {
        let mapper = AuthMapper::new(&self.config.placeholders);
        let mapping = mapper.map_operation(
            descriptor.operation.get("security"),
            &descriptor.global.security,
        );

        let params = descriptor
            .parameters_in("query")
            .into_iter()
            .filter_map(parameter_field)
            .collect();
        let mut headers: Vec<Field> = descriptor
            .parameters_in("header")
            .into_iter()
            .filter_map(parameter_field)
            .collect();
        headers.extend(mapping.header);

        let body = request_body(descriptor.operation.get("requestBody"))?;
        let docs = descriptor
            .operation
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let item = RequestItemBuilder::new(descriptor.name(), descriptor.method, &descriptor.url())
            .params(params)
            .headers(headers)
            .body(body)
            .auth(mapping.auth)
            .docs(docs)
            .uri_vars_from_url()
            .build_item();
        Ok(item)
    }
}

impl FormatAdapter for OpenApiImporter<'_> {
    fn format(&self) -> SourceFormat {
        SourceFormat::OpenApi
    }

    fn collection_name(&self, document: &Value) -> String {
        document
            .pointer("/info/title")
            .and_then(scalar_to_string)
            .unwrap_or_default()
    }

    fn convert(&self, document: &Value) -> Result<Vec<Item>, ConversionError> {
        let resolved = resolve_document(document, self.config.refs.max_depth);
        let global = GlobalContext::from_document(&resolved);
        debug!("Using base URL '{}'", global.base_url);

        let descriptors = extract_operations(&resolved, &global)?;
        let mut grouper = TagGrouper::new();
        for descriptor in &descriptors {
            grouper.push(descriptor.tag(), self.build_request(descriptor)?);
        }
        info!("Converted {} OpenAPI operations", descriptors.len());
        Ok(grouper.into_items())
    }
}

fn parameter_field(parameter: &Value) -> Option<Field> {
    let name = parameter.get("name").and_then(Value::as_str)?;
    let description = parameter
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let required = parameter
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(Field::new(name, "", description, required))
}

fn request_body(request_body: Option<&Value>) -> Result<Body, ConversionError> {
    let Some(content) = request_body
        .and_then(|body| body.get("content"))
        .and_then(Value::as_object)
    else {
        return Ok(Body::none());
    };
    let Some((mime, mode, media)) = select_media_type(content) else {
        debug!("No supported media type in request body");
        return Ok(Body::none());
    };
    let schema = media.get("schema");

    let body = match mode {
        BodyMode::Json => {
            let scaffold = match schema {
                Some(schema) => serde_json::to_string_pretty(&flatten_schema(schema))?,
                None => String::new(),
            };
            Body::literal(mode, scaffold)
        }
        BodyMode::FormUrlEncoded | BodyMode::MultipartForm => {
            let fields = schema
                .and_then(|s| s.get("properties"))
                .and_then(Value::as_object)
                .map(|properties| {
                    properties
                        .iter()
                        .map(|(name, property)| {
                            let description = property
                                .get("description")
                                .and_then(Value::as_str)
                                .unwrap_or_default();
                            Field::new(name, "", description, true)
                        })
                        .collect()
                })
                .unwrap_or_default();
            Body::form(mode, fields)
        }
        BodyMode::Text | BodyMode::Xml => Body::literal(mode, ""),
        BodyMode::None => Body::none(),
    };
    debug!("Request body uses {}", mime);
    Ok(body)
}
