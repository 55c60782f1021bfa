use crate::mutations::DEFAULT_FRESH_KEY_PREFIX;
use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "jqgen.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo steps kept (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Prefix of keys synthesized when a node is inserted into an object
    #[serde(default = "default_fresh_key_prefix")]
    pub fresh_key_prefix: String,

    /// Output shown when the document or the expression cannot be evaluated
    #[serde(default = "default_failure_placeholder")]
    pub failure_placeholder: String,

    /// Spaces per level in pretty-printed output
    #[serde(default = "default_output_indent")]
    pub output_indent: usize,
}

fn default_undo_levels() -> usize {
    100
}

fn default_fresh_key_prefix() -> String {
    DEFAULT_FRESH_KEY_PREFIX.to_string()
}

fn default_failure_placeholder() -> String {
    "invalid JSON or expression".to_string()
}

fn default_output_indent() -> usize {
    2
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_levels: default_undo_levels(),
            fresh_key_prefix: default_fresh_key_prefix(),
            failure_placeholder: default_failure_placeholder(),
            output_indent: default_output_indent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "undoLevels": 20,
            "freshKeyPrefix": "field",
            "failurePlaceholder": "error"
        }"#;

        let config = EditorConfig::from_json(json).unwrap();
        assert_eq!(config.undo_levels, 20);
        assert_eq!(config.fresh_key_prefix, "field");
        assert_eq!(config.failure_placeholder, "error");
        assert_eq!(config.output_indent, 2);
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.undo_levels, 100);
        assert_eq!(config.fresh_key_prefix, "newProperty");
        assert_eq!(config, EditorConfig::from_json("{}").unwrap());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(EditorConfig::load(dir.path()).unwrap(), EditorConfig::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "outputIndent": 4 }"#).unwrap();
        assert_eq!(EditorConfig::load(dir.path()).unwrap().output_indent, 4);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ broken").unwrap();
        assert!(matches!(
            EditorConfig::load(dir.path()),
            Err(EditorError::Json(_))
        ));
    }
}
