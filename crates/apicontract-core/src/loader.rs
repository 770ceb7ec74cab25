//! Contract document loading: file → `serde_json::Value` → adapter

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::adapter::SpecAdapter;
use crate::error::SpecError;
use crate::registry::AdapterRegistry;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// Read a contract file and hand it to the matching adapter.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed, or no adapter in
/// `registry` accepts it.
pub fn load(path: &Path, registry: &AdapterRegistry) -> Result<SpecAdapter, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(path.to_path_buf(), e.to_string()))?;
    let doc = parse_document(path, &content)?;
    Ok(registry.load(doc)?)
}

/// Parse a contract from JSON or YAML.
///
/// Detection strategy: try extension first (`.yaml`/`.yml`/`.json`), then
/// fall back to content sniffing (leading `{` → JSON, otherwise YAML).
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the content is not valid in the
/// detected format.
pub fn parse_document(path: &Path, content: &str) -> Result<Value, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => parse_yaml(content),
        "json" => parse_json(content),
        _ => {
            if content.trim_start().starts_with('{') {
                parse_json(content)
            } else {
                parse_yaml(content)
            }
        }
    }
}

fn parse_json(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|e| LoadError::Parse(format!("Invalid JSON: {e}")))
}

fn parse_yaml(content: &str) -> Result<Value, LoadError> {
    serde_yml::from_str(content).map_err(|e| LoadError::Parse(format!("Invalid YAML: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SpecVersion;

    const YAML: &str = "swagger: \"2.0\"\ninfo:\n  title: Pets\n  version: \"1\"\npaths: {}\n";

    #[test]
    fn yaml_by_extension() {
        let doc = parse_document(Path::new("api.yaml"), YAML).unwrap();
        assert_eq!(doc["info"]["title"], "Pets");
    }

    #[test]
    fn json_by_sniffing() {
        let doc = parse_document(Path::new("api"), r#"{"openapi": "3.0.1"}"#).unwrap();
        assert_eq!(doc["openapi"], "3.0.1");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_document(Path::new("api.json"), "{oops").unwrap_err();
        assert!(matches!(err, LoadError::Parse(msg) if msg.starts_with("Invalid JSON")));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pets.yml");
        std::fs::write(&path, YAML).unwrap();

        let spec = load(&path, &AdapterRegistry::with_defaults()).unwrap();
        assert_eq!(spec.version(), SpecVersion::Swagger2);
        assert_eq!(spec.project_info().title, "Pets");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/api.yaml"), &AdapterRegistry::with_defaults())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(..)));
    }
}
