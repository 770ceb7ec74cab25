//! Project configuration for contract testing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::overrides::Override;

/// Matches any content type in request/response filters
pub const ANY_CONTENT_TYPE: &str = "*";

/// Config file names looked up when no path is given, first match wins.
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    [".apicontract.toml", ".apicontract.json", "apicontract.toml"];

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Swagger / OpenAPI document path (local file)
    pub spec: PathBuf,

    /// Host to test against, by name or index (first host when unset)
    #[serde(default)]
    pub host: Option<String>,

    /// Operation to test, by summary or operationId
    #[serde(default)]
    pub resource: Option<String>,

    /// Request content type to send ("*" = first declared)
    #[serde(default = "any_content_type")]
    pub request_content_type: String,

    /// Expected response status (0 = first declared)
    #[serde(default)]
    pub response_status: u16,

    /// Expected response content type ("*" = any)
    #[serde(default = "any_content_type")]
    pub response_content_type: String,

    /// Request timeout in seconds (transport default when unset)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Patches applied to resolved contract values
    #[serde(default, rename = "override", skip_serializing_if = "Override::is_empty")]
    pub overrides: Override,
}

fn any_content_type() -> String {
    ANY_CONTENT_TYPE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec: PathBuf::from("openapi.yaml"),
            host: None,
            resource: None,
            request_content_type: any_content_type(),
            response_status: 0,
            response_content_type: any_content_type(),
            timeout_secs: None,
            overrides: Override::default(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from the first default location that exists, or defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// First existing default config file in the working directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        Self::default_path_in(Path::new(""))
    }

    /// First existing default config file under `dir`, in
    /// [`DEFAULT_CONFIG_FILES`] order.
    #[must_use]
    pub fn default_path_in(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Create example config file
    #[must_use]
    pub fn example() -> &'static str {
        r#"# apicontract configuration

# Swagger 2.0 / OpenAPI 3.0 document (local file path, YAML or JSON)
spec = "openapi.yaml"

# Host to test: server description / scheme name, or index (default: first)
# host = "staging"

# Operation to test (summary or operationId)
# resource = "ListWidgets"

# Request / response selection ("*" and 0 mean "first declared")
# request_content_type = "application/json"
# response_status = 200
# response_content_type = "application/json"

# Request timeout in seconds
# timeout_secs = 10

# Swap contract values without editing the document
# [override.security]
# example = "real-api-key"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
