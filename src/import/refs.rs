//! Internal `$ref` resolution
//!
//! Replaces every `{"$ref": "#/components/..."}` node with the component it
//! points to, recursing into the substituted content. References that cannot
//! be followed are soft misses: the node is returned unchanged.
//!
//! Expansion stops at a reference already being expanded further up the
//! chain, or once `max_depth` nested expansions are active. Both leave the
//! `$ref` node in place.

use crate::config::DEFAULT_MAX_REF_DEPTH;
use serde_json::Value;
use tracing::{debug, warn};

/// Prefix of references into the document's own components index
pub const LOCAL_COMPONENTS_PREFIX: &str = "#/components/";

/// Resolver for references into one document's `components` index
#[derive(Debug, Clone)]
pub struct RefResolver<'a> {
    components: &'a Value,
    max_depth: usize,
}

impl<'a> RefResolver<'a> {
    /// Create a resolver over a `components` index
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_import_sdk::import::refs::RefResolver;
    /// use serde_json::json;
    ///
    /// let components = json!({ "schemas": { "Id": { "type": "string" } } });
    /// let resolver = RefResolver::new(&components);
    /// let resolved = resolver.resolve(&json!({ "$ref": "#/components/schemas/Id" }));
    /// assert_eq!(resolved, json!({ "type": "string" }));
    /// ```
    pub fn new(components: &'a Value) -> Self {
        Self {
            components,
            max_depth: DEFAULT_MAX_REF_DEPTH,
        }
    }

    /// Limit the number of nested expansions
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve every local reference in `node`, returning a new tree
    pub fn resolve(&self, node: &Value) -> Value {
        let mut chain = Vec::new();
        self.resolve_node(node, &mut chain)
    }

    fn resolve_node(&self, node: &Value, chain: &mut Vec<String>) -> Value {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.expand_reference(node, reference, chain);
                }
                Value::Object(
                    map.iter()
                        .map(|(key, value)| (key.clone(), self.resolve_node(value, chain)))
                        .collect(),
                )
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_node(item, chain))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn expand_reference(&self, node: &Value, reference: &str, chain: &mut Vec<String>) -> Value {
        let Some(pointer) = reference.strip_prefix(LOCAL_COMPONENTS_PREFIX) else {
            debug!("Leaving non-local reference {} unresolved", reference);
            return node.clone();
        };

        if chain.iter().any(|active| active == reference) {
            warn!("Reference cycle through {}, leaving it unresolved", reference);
            return node.clone();
        }
        if chain.len() >= self.max_depth {
            warn!(
                "Reference {} exceeds the maximum depth of {}, leaving it unresolved",
                reference, self.max_depth
            );
            return node.clone();
        }

        match self.lookup(pointer) {
            Some(target) => {
                chain.push(reference.to_string());
                let resolved = self.resolve_node(target, chain);
                chain.pop();
                resolved
            }
            None => {
                debug!("Reference {} not found in components", reference);
                node.clone()
            }
        }
    }

    fn lookup(&self, pointer: &str) -> Option<&'a Value> {
        pointer
            .split('/')
            .try_fold(self.components, |current, segment| {
                current.get(decode_pointer_segment(segment).as_str())
            })
    }
}

/// Resolve every local reference of a whole document against its own
/// `components` index.
pub fn resolve_document(document: &Value, max_depth: usize) -> Value {
    let empty = Value::Null;
    let components = document.get("components").unwrap_or(&empty);
    RefResolver::new(components)
        .with_max_depth(max_depth)
        .resolve(document)
}

/// Decode a JSON Pointer segment (`~1` is `/`, `~0` is `~`).
fn decode_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
