//! Security scheme to auth mapping
//!
//! Picks the security scheme that applies to an operation and maps it onto
//! the collection auth model.
//!
//! | type   | scheme / in | mode   | payload                               |
//! |--------|-------------|--------|---------------------------------------|
//! | http   | basic       | basic  | username / password placeholders      |
//! | http   | bearer      | bearer | token placeholder                     |
//! | apiKey | header      | none   | header field named after the key      |
//!
//! Every other scheme maps to mode `none` with nothing injected.

use crate::config::PlaceholderSection;
use crate::models::{Auth, Field};
use serde_json::{Map, Value};
use tracing::debug;

/// The security schemes a document declares and its document-wide defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityContext {
    /// `components.securitySchemes`, keyed by scheme name
    pub schemes: Map<String, Value>,
    /// Scheme names listed in the document-wide `security` requirement
    pub defaults: Vec<String>,
}

impl SecurityContext {
    /// Read the scheme index and default requirement from an OpenAPI document
    pub fn from_document(document: &Value) -> Self {
        let schemes = document
            .pointer("/components/securitySchemes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let defaults = document
            .get("security")
            .and_then(Value::as_array)
            .map(|requirements| {
                requirements
                    .iter()
                    .filter_map(Value::as_object)
                    .flat_map(|requirement| requirement.keys().cloned())
                    .collect()
            })
            .unwrap_or_default();
        Self { schemes, defaults }
    }

    /// Look up a scheme by name
    pub fn scheme(&self, name: &str) -> Option<&Value> {
        self.schemes.get(name)
    }
}

/// Auth settings for one request plus any header the scheme injects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthMapping {
    pub auth: Auth,
    pub header: Option<Field>,
}

/// Maps security schemes onto request auth
#[derive(Debug, Clone)]
pub struct AuthMapper<'a> {
    placeholders: &'a PlaceholderSection,
}

impl<'a> AuthMapper<'a> {
    pub fn new(placeholders: &'a PlaceholderSection) -> Self {
        Self { placeholders }
    }

    /// Map the auth of an operation.
    ///
    /// # Arguments
    ///
    /// * `operation_security` - The operation's own `security` list, if any.
    /// * `context` - The document's schemes and default requirement.
    pub fn map_operation(
        &self,
        operation_security: Option<&Value>,
        context: &SecurityContext,
    ) -> AuthMapping {
        match select_scheme(operation_security, context) {
            Some(scheme) => self.map_scheme(scheme),
            None => AuthMapping::default(),
        }
    }

    /// Map a single security scheme descriptor
    pub fn map_scheme(&self, scheme: &Value) -> AuthMapping {
        match classify(scheme) {
            Some(SupportedScheme::Basic) => AuthMapping {
                auth: Auth::basic(&self.placeholders.username, &self.placeholders.password),
                header: None,
            },
            Some(SupportedScheme::Bearer) => AuthMapping {
                auth: Auth::bearer(&self.placeholders.token),
                header: None,
            },
            Some(SupportedScheme::ApiKeyHeader(name)) => AuthMapping {
                auth: Auth::none(),
                header: Some(Field::new(name, &self.placeholders.api_key, "", true)),
            },
            None => {
                debug!("Security scheme {} has no auth mapping", scheme);
                AuthMapping::default()
            }
        }
    }
}

enum SupportedScheme {
    Basic,
    Bearer,
    ApiKeyHeader(String),
}

fn classify(scheme: &Value) -> Option<SupportedScheme> {
    let field = |key: &str| {
        scheme
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase)
    };
    match field("type")?.as_str() {
        "http" => match field("scheme")?.as_str() {
            "basic" => Some(SupportedScheme::Basic),
            "bearer" => Some(SupportedScheme::Bearer),
            _ => None,
        },
        "apikey" if field("in").as_deref() == Some("header") => scheme
            .get("name")
            .and_then(Value::as_str)
            .map(|name| SupportedScheme::ApiKeyHeader(name.to_string())),
        _ => None,
    }
}

/// Choose the scheme that applies to an operation.
///
/// 1. The operation's own non-empty `security` list: its first scheme name.
/// 2. The first document-wide default naming a declared scheme.
///
/// A scheme that is only declared applies to nothing.
pub fn select_scheme<'c>(
    operation_security: Option<&Value>,
    context: &'c SecurityContext,
) -> Option<&'c Value> {
    let own_scheme = operation_security
        .and_then(Value::as_array)
        .and_then(|requirements| requirements.first())
        .and_then(Value::as_object)
        .and_then(|requirement| requirement.keys().next());
    if let Some(name) = own_scheme {
        return context.scheme(name);
    }

    context
        .defaults
        .iter()
        .find_map(|name| context.scheme(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthMode;
    use serde_json::json;

    fn context() -> SecurityContext {
        SecurityContext::from_document(&json!({
            "components": {
                "securitySchemes": {
                    "oauth": { "type": "oauth2", "flows": {} },
                    "basicAuth": { "type": "http", "scheme": "basic" },
                    "bearerAuth": { "type": "http", "scheme": "Bearer" },
                    "keyAuth": { "type": "apiKey", "in": "header", "name": "X-API-Key" },
                    "queryKey": { "type": "apiKey", "in": "query", "name": "key" }
                }
            }
        }))
    }

    #[test]
    fn test_operation_scheme_takes_precedence() {
        let placeholders = PlaceholderSection::default();
        let mapper = AuthMapper::new(&placeholders);
        let mut context = context();
        context.defaults = vec!["basicAuth".to_string()];

        let mapping = mapper.map_operation(Some(&json!([{ "bearerAuth": [] }])), &context);
        assert_eq!(mapping.auth.mode, AuthMode::Bearer);
        assert_eq!(mapping.auth.bearer.unwrap().token, "{{token}}");
        assert!(mapping.header.is_none());
    }

    #[test]
    fn test_document_default_is_used_without_operation_security() {
        let placeholders = PlaceholderSection::default();
        let mapper = AuthMapper::new(&placeholders);
        let mut context = context();
        context.defaults = vec!["basicAuth".to_string()];

        let mapping = mapper.map_operation(None, &context);
        assert_eq!(mapping.auth.mode, AuthMode::Basic);
        let basic = mapping.auth.basic.unwrap();
        assert_eq!(basic.username, "{{username}}");
        assert_eq!(basic.password, "{{password}}");
    }

    #[test]
    fn test_declared_schemes_without_requirement_mean_no_auth() {
        let placeholders = PlaceholderSection::default();
        let mapper = AuthMapper::new(&placeholders);

        for security in [None, Some(json!([]))] {
            let mapping = mapper.map_operation(security.as_ref(), &context());
            assert_eq!(mapping, AuthMapping::default());
        }
    }

    #[test]
    fn test_empty_operation_list_falls_through_to_defaults() {
        let placeholders = PlaceholderSection::default();
        let mapper = AuthMapper::new(&placeholders);
        let mut context = context();
        context.defaults = vec!["missing".to_string(), "bearerAuth".to_string()];

        let mapping = mapper.map_operation(Some(&json!([])), &context);
        assert_eq!(mapping.auth.mode, AuthMode::Bearer);
    }

    #[test]
    fn test_api_key_header_injects_field() {
        let placeholders = PlaceholderSection::default();
        let mapper = AuthMapper::new(&placeholders);

        let mapping = mapper.map_operation(Some(&json!([{ "keyAuth": [] }])), &context());
        assert_eq!(mapping.auth, Auth::none());
        let header = mapping.header.unwrap();
        assert_eq!(header.name, "X-API-Key");
        assert_eq!(header.value, "{{apiKey}}");
        assert!(header.enabled);
    }

    #[test]
    fn test_unmapped_schemes_are_soft_misses() {
        let placeholders = PlaceholderSection::default();
        let mapper = AuthMapper::new(&placeholders);

        for name in ["oauth", "queryKey", "unknown"] {
            let mut requirement = Map::new();
            requirement.insert(name.to_string(), json!([]));
            let security = json!([requirement]);
            let mapping = mapper.map_operation(Some(&security), &context());
            assert_eq!(mapping, AuthMapping::default(), "scheme {}", name);
        }
    }

    #[test]
    fn test_no_schemes_means_no_auth() {
        let placeholders = PlaceholderSection::default();
        let mapper = AuthMapper::new(&placeholders);
        let mapping = mapper.map_operation(None, &SecurityContext::default());
        assert_eq!(mapping.auth.mode, AuthMode::None);
        assert!(mapping.header.is_none());
    }

    #[test]
    fn test_defaults_read_from_document() {
        let context = SecurityContext::from_document(&json!({
            "security": [{ "bearerAuth": [] }, { "basicAuth": [] }]
        }));
        assert_eq!(context.defaults, vec!["bearerAuth", "basicAuth"]);
        assert!(context.schemes.is_empty());
    }
}
