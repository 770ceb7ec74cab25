//! Itemized contract mismatches

use apicontract_core::DataType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One discrepancy between a live response and the contract.
///
/// Paths are JSON-path-like, rooted at the response body: `$`, `$.id`,
/// `$[2].parts[0].sku`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// Required property absent (or null)
    PropertyMissing { path: String },
    PropertyType {
        path: String,
        expected: DataType,
        actual: String,
    },
    /// Required response header absent
    HeaderMissing { name: String },
    HeaderType {
        name: String,
        expected: DataType,
        value: String,
    },
    StatusMismatch { expected: u16, actual: u16 },
    ContentTypeMismatch {
        expected: String,
        actual: Option<String>,
    },
    /// JSON expected, body empty
    EmptyBody,
    /// JSON expected, body does not parse
    MalformedBody { error: String },
    ExpectedArray { path: String, actual: String },
    ExpectedObject { path: String, actual: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PropertyMissing { path } => {
                write!(f, "Property '{path}' is required but is not present.")
            }
            Self::PropertyType {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Property '{path}' has a wrong type (expected {expected}, got {actual})."
            ),
            Self::HeaderMissing { name } => {
                write!(f, "Header '{name}' is required but is not present.")
            }
            Self::HeaderType {
                name,
                expected,
                value,
            } => write!(
                f,
                "Header '{name}' has a wrong type (expected {expected}, got '{value}')."
            ),
            Self::StatusMismatch { expected, actual } => write!(
                f,
                "Expected the {expected} status in response, but got {actual}."
            ),
            Self::ContentTypeMismatch { expected, actual } => write!(
                f,
                "Expected the '{expected}' Content-Type in response, but got '{}'.",
                actual.as_deref().unwrap_or("")
            ),
            Self::EmptyBody => f.write_str("Got an empty JSON response."),
            Self::MalformedBody { error } => write!(f, "Got a malformed JSON response: {error}."),
            Self::ExpectedArray { path, actual } => write!(
                f,
                "Expected an array at '{path}', but received something else ({actual})."
            ),
            Self::ExpectedObject { path, actual } => write!(
                f,
                "Expected an object at '{path}', but received something else ({actual})."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let d = Diagnostic::PropertyType {
            path: "$[0].id".into(),
            expected: DataType::Number,
            actual: "string".into(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "propertyType");
        assert_eq!(json["expected"], "number");
    }

    #[test]
    fn messages() {
        assert_eq!(
            Diagnostic::StatusMismatch {
                expected: 200,
                actual: 500
            }
            .to_string(),
            "Expected the 200 status in response, but got 500."
        );
        assert_eq!(
            Diagnostic::ContentTypeMismatch {
                expected: "application/json".into(),
                actual: None
            }
            .to_string(),
            "Expected the 'application/json' Content-Type in response, but got ''."
        );
    }
}
