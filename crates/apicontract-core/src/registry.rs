//! Adapter registry: pick the adapter whose fingerprint matches a document
//!
//! The registry is a plain value owned by whoever loads documents; there is
//! no process-wide registration.

use serde_json::Value;

use crate::adapter::{SpecAdapter, SpecVersion};
use crate::error::SpecError;

/// A top-level `key: value` pair identifying a document version.
///
/// A trailing `*` in `pattern` matches any suffix ("3.0.*").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub key: String,
    pub pattern: String,
}

impl Fingerprint {
    pub fn new(key: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pattern: pattern.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        let Some(actual) = doc.get(&self.key).and_then(declared_version) else {
            return false;
        };
        match self.pattern.strip_suffix('*') {
            Some(prefix) => actual.starts_with(prefix),
            None => actual == self.pattern,
        }
    }
}

/// YAML happily turns `swagger: 2.0` into a float.
fn declared_version(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            let text = n.to_string();
            Some(if text.contains('.') { text } else { format!("{text}.0") })
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    entries: Vec<(Fingerprint, SpecVersion)>,
}

impl AdapterRegistry {
    /// Empty registry; nothing loads until fingerprints are registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `swagger: "2.0"` and `openapi: "3.0.*"`.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with(Fingerprint::new("swagger", "2.0"), SpecVersion::Swagger2)
            .with(Fingerprint::new("openapi", "3.0.*"), SpecVersion::OpenApi3)
    }

    #[must_use]
    pub fn with(mut self, fingerprint: Fingerprint, version: SpecVersion) -> Self {
        self.register(fingerprint, version);
        self
    }

    pub fn register(&mut self, fingerprint: Fingerprint, version: SpecVersion) {
        self.entries.push((fingerprint, version));
    }

    /// Version of the first registered fingerprint matching `doc`.
    #[must_use]
    pub fn detect(&self, doc: &Value) -> Option<SpecVersion> {
        self.entries
            .iter()
            .find(|(fp, _)| fp.matches(doc))
            .map(|(_, version)| *version)
    }

    /// Wrap `doc` in the adapter for its version.
    ///
    /// # Errors
    ///
    /// [`SpecError::UnknownVersion`] when no fingerprint matches.
    pub fn load(&self, doc: Value) -> Result<SpecAdapter, SpecError> {
        match self.detect(&doc) {
            Some(version) => Ok(SpecAdapter::new(version, doc)),
            None => Err(SpecError::UnknownVersion {
                swagger: doc.get("swagger").and_then(declared_version),
                openapi: doc.get("openapi").and_then(declared_version),
            }),
        }
    }
}
