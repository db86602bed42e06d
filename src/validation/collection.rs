//! Collection validation functionality
//!
//! Checks a produced collection for the structural guarantees consumers rely
//! on: unique uids, auth and body payloads that match their mode, and a
//! non-empty version.

use crate::import::CollectionPostProcessor;
use crate::import::error::ConversionError;
use crate::models::{Auth, AuthMode, Body, BodyMode, Collection, RequestItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of collection validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[must_use = "validation results should be checked for violations"]
pub struct CollectionValidationResult {
    /// Uids that appear more than once, each listed once
    pub duplicate_uids: Vec<String>,
    /// Auth, body or envelope shapes that break the mode pairing
    pub shape_violations: Vec<ShapeViolation>,
}

impl CollectionValidationResult {
    pub fn is_valid(&self) -> bool {
        self.duplicate_uids.is_empty() && self.shape_violations.is_empty()
    }

    /// Every violation as a message, duplicates first
    pub fn messages(&self) -> Vec<String> {
        self.duplicate_uids
            .iter()
            .map(|uid| format!("uid '{}' is used more than once", uid))
            .chain(self.shape_violations.iter().map(ToString::to_string))
            .collect()
    }

    /// Turn the result into an error when it holds any violation
    pub fn into_result(self) -> Result<(), CollectionValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CollectionValidationError::Violations(self.messages()))
        }
    }
}

/// A request or envelope whose shape breaks a pairing rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeViolation {
    pub uid: String,
    pub name: String,
    pub message: String,
}

impl std::fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' ({}): {}", self.name, self.uid, self.message)
    }
}

/// Error during collection validation
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum CollectionValidationError {
    #[error("{} violation(s): {}", .0.len(), .0.join("; "))]
    Violations(Vec<String>),
}

/// Collection validator
#[derive(Debug, Default)]
pub struct CollectionValidator;

impl CollectionValidator {
    /// Create a new collection validator
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_import_sdk::models::Collection;
    /// use collection_import_sdk::validation::collection::CollectionValidator;
    ///
    /// let validator = CollectionValidator::new();
    /// let result = validator.validate(&Collection::new("Pets", vec![]));
    /// assert!(result.is_valid());
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Run every check and collect the violations found
    pub fn validate(&self, collection: &Collection) -> CollectionValidationResult {
        let mut result = CollectionValidationResult {
            duplicate_uids: self.find_duplicate_uids(collection),
            shape_violations: Vec::new(),
        };

        if collection.version.trim().is_empty() {
            result.shape_violations.push(ShapeViolation {
                uid: collection.uid.clone(),
                name: collection.name.clone(),
                message: "collection version is empty".to_string(),
            });
        }

        for item in collection.requests() {
            if let Some(message) = check_auth(&item.request.auth) {
                result.shape_violations.push(violation(item, message));
            }
            if let Some(message) = check_body(&item.request.body) {
                result.shape_violations.push(violation(item, message));
            }
        }

        debug!(
            "Validated collection '{}': {} duplicate uid(s), {} shape violation(s)",
            collection.name,
            result.duplicate_uids.len(),
            result.shape_violations.len()
        );
        result
    }

    /// Uids seen more than once anywhere in the tree
    pub fn find_duplicate_uids(&self, collection: &Collection) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for uid in collection.uids() {
            if !seen.insert(uid) && reported.insert(uid) {
                duplicates.push(uid.to_string());
            }
        }
        duplicates
    }
}

impl CollectionPostProcessor for CollectionValidator {
    fn name(&self) -> &str {
        "collection-validator"
    }

    fn process(&self, collection: Collection) -> Result<Collection, ConversionError> {
        let result = self.validate(&collection);
        if !result.is_valid() {
            warn!(
                "Collection '{}' failed validation with {} violation(s)",
                collection.name,
                result.messages().len()
            );
        }
        result.into_result()?;
        Ok(collection)
    }
}

fn violation(item: &RequestItem, message: String) -> ShapeViolation {
    ShapeViolation {
        uid: item.uid.clone(),
        name: item.name.clone(),
        message,
    }
}

fn check_auth(auth: &Auth) -> Option<String> {
    let present = [
        ("basic", auth.basic.is_some()),
        ("bearer", auth.bearer.is_some()),
        ("digest", auth.digest.is_some()),
    ];
    let expected = match auth.mode {
        AuthMode::None => None,
        AuthMode::Basic => Some("basic"),
        AuthMode::Bearer => Some("bearer"),
        AuthMode::Digest => Some("digest"),
    };
    pairing_error("auth", present, expected, true)
}

fn check_body(body: &Body) -> Option<String> {
    let present = [
        ("json", body.json.is_some()),
        ("text", body.text.is_some()),
        ("xml", body.xml.is_some()),
        ("formUrlEncoded", !body.form_url_encoded.is_empty()),
        ("multipartForm", !body.multipart_form.is_empty()),
    ];
    let (expected, required) = match body.mode {
        BodyMode::None => (None, false),
        BodyMode::Json => (Some("json"), true),
        BodyMode::Text => (Some("text"), true),
        BodyMode::Xml => (Some("xml"), true),
        // Form payloads may be empty lists
        BodyMode::FormUrlEncoded => (Some("formUrlEncoded"), false),
        BodyMode::MultipartForm => (Some("multipartForm"), false),
    };
    pairing_error("body", present, expected, required)
}

/// Only the slot named by the mode may hold data, and it must when
/// `required` is set.
fn pairing_error<const N: usize>(
    part: &str,
    present: [(&str, bool); N],
    expected: Option<&str>,
    required: bool,
) -> Option<String> {
    if let Some(slot) = expected
        && required
        && !present.iter().any(|(name, set)| *name == slot && *set)
    {
        return Some(format!("{} mode '{}' has no payload", part, slot));
    }

    let stray: Vec<&str> = present
        .iter()
        .filter(|(name, set)| *set && Some(*name) != expected)
        .map(|(name, _)| *name)
        .collect();
    if stray.is_empty() {
        None
    } else {
        Some(format!(
            "{} carries payloads not matching its mode: {}",
            part,
            stray.join(", ")
        ))
    }
}
