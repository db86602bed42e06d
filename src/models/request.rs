//! Request model structures
//!
//! Every struct here serializes with all of its keys present. Unused payloads
//! hold neutral defaults (`null`, `""` or `[]`) rather than being omitted, so
//! downstream consumers can rely on a closed shape.

use super::enums::{AuthMode, BodyMode, HttpMethod};
use super::new_uid;
use serde::{Deserialize, Serialize};

/// A named value: header, query parameter or form body entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub uid: String,
    pub name: String,
    pub value: String,
    pub description: String,
    /// Seeded from the source `required` flag. A default, not user intent.
    pub enabled: bool,
}

impl Field {
    /// Create a field with a fresh uid
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Field {
            uid: new_uid(),
            name: name.into(),
            value: value.into(),
            description: description.into(),
            enabled,
        }
    }
}

/// A request-level variable, such as a URI template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    pub uid: String,
    pub name: String,
    pub value: String,
    pub enabled: bool,
    pub local: bool,
}

impl Var {
    /// Create an enabled, non-local variable with an empty value
    pub fn uri_parameter(name: impl Into<String>) -> Self {
        Var {
            uid: new_uid(),
            name: name.into(),
            value: String::new(),
            enabled: true,
            local: false,
        }
    }
}

/// Request variables grouped by the phase they apply to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestVars {
    pub req: Vec<Var>,
}

/// Basic auth credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Bearer token auth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearerAuth {
    pub token: String,
}

/// Digest auth credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestAuth {
    pub username: String,
    pub password: String,
}

/// Authentication settings of a request
///
/// At most one payload is non-null, and only the one matching `mode`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    pub mode: AuthMode,
    pub basic: Option<BasicAuth>,
    pub bearer: Option<BearerAuth>,
    pub digest: Option<DigestAuth>,
}

impl Auth {
    /// No authentication
    pub fn none() -> Self {
        Self::default()
    }

    /// Basic authentication with the given credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth {
            mode: AuthMode::Basic,
            basic: Some(BasicAuth {
                username: username.into(),
                password: password.into(),
            }),
            ..Default::default()
        }
    }

    /// Bearer authentication with the given token
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth {
            mode: AuthMode::Bearer,
            bearer: Some(BearerAuth {
                token: token.into(),
            }),
            ..Default::default()
        }
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub mode: BodyMode,
    pub json: Option<String>,
    pub text: Option<String>,
    pub xml: Option<String>,
    pub form_url_encoded: Vec<Field>,
    pub multipart_form: Vec<Field>,
}

impl Body {
    /// Empty body with mode `none`
    pub fn none() -> Self {
        Self::default()
    }

    /// A literal payload for one of the `json`, `text` or `xml` modes.
    ///
    /// Form modes take fields instead; passing them here yields an empty body
    /// of that mode.
    pub fn literal(mode: BodyMode, payload: impl Into<String>) -> Self {
        let payload = Some(payload.into());
        match mode {
            BodyMode::Json => Body {
                mode,
                json: payload,
                ..Default::default()
            },
            BodyMode::Text => Body {
                mode,
                text: payload,
                ..Default::default()
            },
            BodyMode::Xml => Body {
                mode,
                xml: payload,
                ..Default::default()
            },
            _ => Body {
                mode,
                ..Default::default()
            },
        }
    }

    /// A form body for `formUrlEncoded` or `multipartForm`.
    pub fn form(mode: BodyMode, fields: Vec<Field>) -> Self {
        match mode {
            BodyMode::FormUrlEncoded => Body {
                mode,
                form_url_encoded: fields,
                ..Default::default()
            },
            BodyMode::MultipartForm => Body {
                mode,
                multipart_form: fields,
                ..Default::default()
            },
            _ => Body {
                mode,
                ..Default::default()
            },
        }
    }

    /// Fields carried by the form payloads, whichever mode is active
    pub fn form_fields(&self) -> impl Iterator<Item = &Field> {
        self.form_url_encoded.iter().chain(self.multipart_form.iter())
    }
}

/// A normalized HTTP request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    pub method: HttpMethod,
    pub auth: Auth,
    pub headers: Vec<Field>,
    pub params: Vec<Field>,
    pub vars: RequestVars,
    pub body: Body,
    pub docs: String,
}

impl Request {
    /// Create a request with no auth, no fields and an empty body
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Request {
            url: url.into(),
            method,
            auth: Auth::none(),
            headers: Vec::new(),
            params: Vec::new(),
            vars: RequestVars::default(),
            body: Body::none(),
            docs: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_every_key() {
        let request = Request::new(HttpMethod::Get, "{{baseUri}}/pets");
        let value = serde_json::to_value(&request).unwrap();

        for key in ["url", "method", "auth", "headers", "params", "vars", "body", "docs"] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["vars"], json!({ "req": [] }));
        assert_eq!(
            value["body"],
            json!({
                "mode": "none",
                "json": null,
                "text": null,
                "xml": null,
                "formUrlEncoded": [],
                "multipartForm": []
            })
        );
        assert_eq!(
            value["auth"],
            json!({ "mode": "none", "basic": null, "bearer": null, "digest": null })
        );
    }

    #[test]
    fn test_literal_body_populates_only_matching_payload() {
        let body = Body::literal(BodyMode::Xml, "<pet/>");
        assert_eq!(body.mode, BodyMode::Xml);
        assert_eq!(body.xml.as_deref(), Some("<pet/>"));
        assert!(body.json.is_none());
        assert!(body.text.is_none());
        assert!(body.form_url_encoded.is_empty());
    }

    #[test]
    fn test_auth_constructors() {
        let basic = Auth::basic("{{username}}", "{{password}}");
        assert_eq!(basic.mode, AuthMode::Basic);
        assert!(basic.bearer.is_none());
        assert!(basic.digest.is_none());

        let bearer = Auth::bearer("{{token}}");
        assert_eq!(bearer.mode, AuthMode::Bearer);
        assert!(bearer.basic.is_none());
        assert_eq!(bearer.bearer.unwrap().token, "{{token}}");
    }
}
