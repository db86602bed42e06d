//! Request item assembly shared by the format adapters
//!
//! Both adapters gather the same pieces (URL, fields, body, auth) from
//! different source shapes. [`RequestItemBuilder`] turns them into a closed
//! [`RequestItem`] with every key filled.

use crate::models::{
    Auth, Body, BodyMode, Field, HttpMethod, Item, Request, RequestItem, RequestVars, Var,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Variable standing in for the API base URI
pub const BASE_URI_VARIABLE: &str = "{{baseUri}}";

// Runs of slashes, except the pair following a URL scheme
static RE_DUPLICATE_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^:/])/{2,}").expect("Invalid regex"));
static RE_PATH_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"));

/// Collapse duplicate slashes in a URL, keeping the `//` after a scheme.
///
/// # Example
///
/// ```rust
/// use collection_import_sdk::import::request::collapse_slashes;
///
/// assert_eq!(
///     collapse_slashes("https://api.example.com//v1///pets"),
///     "https://api.example.com/v1/pets"
/// );
/// assert_eq!(collapse_slashes("{{baseUri}}//pets"), "{{baseUri}}/pets");
/// ```
pub fn collapse_slashes(url: &str) -> String {
    RE_DUPLICATE_SLASHES.replace_all(url, "${1}/").into_owned()
}

/// Double `{param}` templates to `{{param}}` so they read as variables.
///
/// Segments that are already doubled are left alone.
pub fn escape_path_templates(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.contains("{{") {
                segment.to_string()
            } else {
                RE_PATH_TEMPLATE
                    .replace_all(segment, "{{$1}}")
                    .into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Request variables for each bracketed segment of a URL.
///
/// A segment counts when it starts with `{` and ends with `}`; the base URI
/// variable is skipped. Variables are named after the segment as written.
pub fn uri_vars(url: &str) -> Vec<Var> {
    url.split('/')
        .filter(|segment| {
            segment.len() > 1
                && segment.starts_with('{')
                && segment.ends_with('}')
                && *segment != BASE_URI_VARIABLE
        })
        .map(Var::uri_parameter)
        .collect()
}

/// Pick the body payload for the first known mime type in declaration order.
///
/// Returns the mime key as written in the source, its body mode and the
/// payload node.
pub fn select_media_type(content: &Map<String, Value>) -> Option<(&str, BodyMode, &Value)> {
    BodyMode::MIME_TABLE.iter().find_map(|(mime, mode)| {
        content
            .iter()
            .find(|(key, _)| key_matches(key, mime))
            .map(|(key, payload)| (key.as_str(), *mode, payload))
    })
}

fn key_matches(key: &str, mime: &str) -> bool {
    key.split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(mime))
}

/// Builder for a normalized request item
#[derive(Debug, Clone)]
pub struct RequestItemBuilder {
    name: String,
    request: Request,
}

impl RequestItemBuilder {
    /// Start a request item. The URL has its duplicate slashes collapsed.
    pub fn new(name: impl Into<String>, method: HttpMethod, url: &str) -> Self {
        Self {
            name: name.into(),
            request: Request::new(method, collapse_slashes(url)),
        }
    }

    pub fn headers(mut self, headers: Vec<Field>) -> Self {
        self.request.headers = headers;
        self
    }

    pub fn params(mut self, params: Vec<Field>) -> Self {
        self.request.params = params;
        self
    }

    /// Derive request variables from the bracketed segments of the URL
    pub fn uri_vars_from_url(mut self) -> Self {
        self.request.vars = RequestVars {
            req: uri_vars(&self.request.url),
        };
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.request.body = body;
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.request.auth = auth;
        self
    }

    pub fn docs(mut self, docs: impl Into<String>) -> Self {
        self.request.docs = docs.into();
        self
    }

    pub fn build(self) -> RequestItem {
        RequestItem::new(self.name, self.request)
    }

    pub fn build_item(self) -> Item {
        Item::Request(self.build())
    }
}
