//! Importer configuration file support
//!
//! Handles parsing of `.collection-import.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
#[cfg(feature = "config-file")]
use std::path::Path;
use tracing::warn;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".collection-import.toml";

/// Environment variable for the RAML keyword exclusion set (comma separated)
pub const ENV_RAML_EXCLUDED_KEYS: &str = "COLLECTION_IMPORT_RAML_EXCLUDED_KEYS";

/// Environment variable for the fallback body media type
pub const ENV_DEFAULT_MEDIA_TYPE: &str = "COLLECTION_IMPORT_DEFAULT_MEDIA_TYPE";

/// Environment variable for the maximum nested `$ref` expansion depth
pub const ENV_MAX_REF_DEPTH: &str = "COLLECTION_IMPORT_MAX_REF_DEPTH";

/// Default media type for RAML bodies that declare none of the known mime types
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Default maximum nested `$ref` expansion depth
pub const DEFAULT_MAX_REF_DEPTH: usize = 32;

/// RAML 1.0 structural keywords that can collide with method or resource keys.
const RAML_STRUCTURAL_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "version",
    "baseUri",
    "baseUriParameters",
    "protocols",
    "mediaType",
    "documentation",
    "schemas",
    "types",
    "traits",
    "resourceTypes",
    "annotationTypes",
    "securitySchemes",
    "securedBy",
    "uses",
    "displayName",
    "type",
    "is",
    "uriParameters",
];

/// Error type for configuration handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Failed to serialize config: {0}")]
    SerializationError(String),
}

/// RAML conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RamlSection {
    /// Keys never interpreted as methods or resources. Empty by default, so
    /// every key of a node is considered.
    #[serde(default)]
    pub excluded_keys: Vec<String>,

    /// Media type assumed when a body declares none of the known mime types
    #[serde(default = "default_media_type")]
    pub default_media_type: String,

    /// Use the document's `baseUri` literally instead of the `{{baseUri}}` variable
    #[serde(default)]
    pub literal_base_uri: bool,
}

fn default_media_type() -> String {
    DEFAULT_MEDIA_TYPE.to_string()
}

impl Default for RamlSection {
    fn default() -> Self {
        Self {
            excluded_keys: Vec::new(),
            default_media_type: default_media_type(),
            literal_base_uri: false,
        }
    }
}

impl RamlSection {
    /// The RAML 1.0 root and resource keywords, for callers that want them
    /// filtered out of method/resource interpretation.
    pub fn standard_exclusions() -> Vec<String> {
        RAML_STRUCTURAL_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect()
    }

    /// Whether a key is in the exclusion set
    pub fn is_excluded(&self, key: &str) -> bool {
        self.excluded_keys.iter().any(|k| k == key)
    }
}

/// `$ref` resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefsSection {
    /// Nested expansions allowed before a `$ref` is left unresolved
    #[serde(default = "default_max_ref_depth")]
    pub max_depth: usize,
}

fn default_max_ref_depth() -> usize {
    DEFAULT_MAX_REF_DEPTH
}

impl Default for RefsSection {
    fn default() -> Self {
        Self {
            max_depth: default_max_ref_depth(),
        }
    }
}

/// Placeholder values injected into synthesized auth settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderSection {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_token")]
    pub token: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_username() -> String {
    "{{username}}".to_string()
}

fn default_password() -> String {
    "{{password}}".to_string()
}

fn default_token() -> String {
    "{{token}}".to_string()
}

fn default_api_key() -> String {
    "{{apiKey}}".to_string()
}

impl Default for PlaceholderSection {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            token: default_token(),
            api_key: default_api_key(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.collection-import.toml` configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImporterConfig {
    /// RAML conversion configuration
    #[serde(default)]
    pub raml: RamlSection,

    /// `$ref` resolution configuration
    #[serde(default)]
    pub refs: RefsSection,

    /// Auth placeholder configuration
    #[serde(default)]
    pub placeholders: PlaceholderSection,
}

impl ImporterConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.collection-import.toml` in the directory and falls back to
    /// defaults if it is not there. Environment overrides are applied last.
    #[cfg(feature = "config-file")]
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILENAME);
        if config_path.exists() {
            Self::load_file(&config_path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Load configuration from an explicit file path
    #[cfg(feature = "config-file")]
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.display().to_string(), e.to_string()))?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(feature = "config-file")]
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Convert configuration to TOML string
    #[cfg(feature = "config-file")]
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializationError(e.to_string()))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides read through `lookup`, keyed by the `ENV_*` names.
    ///
    /// A blank media type or a depth that does not parse is ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(keys) = lookup(ENV_RAML_EXCLUDED_KEYS) {
            self.raml.excluded_keys = keys
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }

        if let Some(media_type) = lookup(ENV_DEFAULT_MEDIA_TYPE)
            && !media_type.trim().is_empty()
        {
            self.raml.default_media_type = media_type.trim().to_string();
        }

        if let Some(depth) = lookup(ENV_MAX_REF_DEPTH) {
            match depth.trim().parse() {
                Ok(depth) => self.refs.max_depth = depth,
                Err(_) => warn!("Ignoring {}={:?}: not a depth", ENV_MAX_REF_DEPTH, depth),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImporterConfig::default();
        assert!(config.raml.excluded_keys.is_empty());
        assert_eq!(config.raml.default_media_type, "application/json");
        assert!(!config.raml.literal_base_uri);
        assert_eq!(config.refs.max_depth, DEFAULT_MAX_REF_DEPTH);
        assert_eq!(config.placeholders.api_key, "{{apiKey}}");
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[raml]
excluded_keys = ["types", "traits"]
literal_base_uri = true

[placeholders]
token = "{{accessToken}}"
"#;
        let config = ImporterConfig::parse(toml).unwrap();
        assert_eq!(config.raml.excluded_keys, vec!["types", "traits"]);
        assert!(config.raml.literal_base_uri);
        assert_eq!(config.raml.default_media_type, "application/json");
        assert_eq!(config.placeholders.token, "{{accessToken}}");
        assert_eq!(config.placeholders.username, "{{username}}");
        assert_eq!(config.refs.max_depth, DEFAULT_MAX_REF_DEPTH);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn test_config_toml_round_trip() {
        let mut config = ImporterConfig::default();
        config.raml.excluded_keys = RamlSection::standard_exclusions();
        let toml = config.to_toml().unwrap();
        let parsed = ImporterConfig::parse(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn test_parse_invalid_config() {
        let result = ImporterConfig::parse("[refs]\nmax_depth = \"deep\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = ImporterConfig::default();
        config.raml.excluded_keys = vec!["types".to_string()];
        config.apply_overrides(lookup(&[
            (ENV_RAML_EXCLUDED_KEYS, " traits, ,uriParameters ,"),
            (ENV_DEFAULT_MEDIA_TYPE, " text/plain "),
            (ENV_MAX_REF_DEPTH, " 4 "),
        ]));
        assert_eq!(config.raml.excluded_keys, vec!["traits", "uriParameters"]);
        assert_eq!(config.raml.default_media_type, "text/plain");
        assert_eq!(config.refs.max_depth, 4);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = ImporterConfig::default();
        config.refs.max_depth = 8;
        config.apply_overrides(lookup(&[
            (ENV_DEFAULT_MEDIA_TYPE, "   "),
            (ENV_MAX_REF_DEPTH, "deep"),
        ]));
        assert_eq!(config.raml.default_media_type, DEFAULT_MEDIA_TYPE);
        assert_eq!(config.refs.max_depth, 8);
    }

    #[test]
    fn test_empty_excluded_keys_override_clears_set() {
        let mut config = ImporterConfig::default();
        config.raml.excluded_keys = RamlSection::standard_exclusions();
        config.apply_overrides(lookup(&[(ENV_RAML_EXCLUDED_KEYS, "")]));
        assert!(config.raml.excluded_keys.is_empty());
    }

    #[test]
    fn test_standard_exclusions_cover_collisions() {
        let raml = RamlSection {
            excluded_keys: RamlSection::standard_exclusions(),
            ..Default::default()
        };
        assert!(raml.is_excluded("uriParameters"));
        assert!(raml.is_excluded("types"));
        assert!(!raml.is_excluded("get"));
        assert!(!raml.is_excluded("/pets"));
    }
}
