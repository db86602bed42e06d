//! Enums for the collection model
//!
//! # Serde Casing Conventions
//!
//! - `UPPERCASE`: HTTP method names (HttpMethod)
//! - `lowercase`: auth modes (AuthMode)
//! - `camelCase`: body modes (BodyMode), matching the body payload keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods recognized in RAML resource trees and OpenAPI path items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// All eight methods, in the order they are usually declared.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    /// Upper-case wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Match a document key against the method names, ignoring case.
    ///
    /// Returns `None` for any key that is not exactly a method name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication mode of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    None,
    Basic,
    Bearer,
    Digest,
}

/// Body mode of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyMode {
    #[default]
    None,
    Json,
    Text,
    Xml,
    FormUrlEncoded,
    MultipartForm,
}

impl BodyMode {
    /// Mime type to body mode table.
    ///
    /// Declaration order is significant: when a source declares several mime
    /// types for one body, the first entry of this table that is present wins.
    pub const MIME_TABLE: [(&'static str, BodyMode); 6] = [
        ("multipart/form-data", BodyMode::MultipartForm),
        ("application/x-www-form-urlencoded", BodyMode::FormUrlEncoded),
        ("application/json", BodyMode::Json),
        ("application/xml", BodyMode::Xml),
        ("text/xml", BodyMode::Xml),
        ("text/plain", BodyMode::Text),
    ];

    /// Look up the body mode for a mime type.
    ///
    /// Parameters such as `; charset=utf-8` are ignored and the comparison is
    /// case-insensitive.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::MIME_TABLE
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(essence))
            .map(|(_, mode)| *mode)
    }

    /// Canonical mime type for this mode, `None` for [`BodyMode::None`].
    pub fn mime_type(&self) -> Option<&'static str> {
        Self::MIME_TABLE
            .iter()
            .find(|(_, mode)| mode == self)
            .map(|(mime, _)| *mime)
    }

    /// Whether the payload of this mode is a list of form fields.
    pub fn is_form(&self) -> bool {
        matches!(self, BodyMode::FormUrlEncoded | BodyMode::MultipartForm)
    }
}
