//! Error taxonomy for contract resolution

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coarse classification shared by every hard error in the workspace.
///
/// Contract mismatches found while validating a live response are not
/// errors; they are reported as diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Host, resource, schema or security scheme absent
    NotFound,
    /// Content type, security location or response shape not implemented
    Unsupported,
    /// Malformed schema reference
    RefResolution,
    /// A value needed for a test step is missing from the document
    Configuration,
    /// Network-level failure
    Transport,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Unsupported => "unsupported",
            Self::RefResolution => "reference resolution",
            Self::Configuration => "configuration",
            Self::Transport => "transport",
        })
    }
}

/// Failure while resolving canonical entities out of a raw document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("API host \"{0}\" was not found")]
    HostNotFound(String),
    #[error("Resource \"{0}\" not found")]
    ResourceNotFound(String),
    #[error("Model schema \"{0}\" was not found")]
    SchemaNotFound(String),
    #[error("Security scheme \"{0}\" was not found")]
    SecuritySchemeNotFound(String),
    #[error("Could not determine the type of '{owner}' from the declared type '{declared}'")]
    UnknownType { owner: String, declared: String },
    #[error("Security scheme \"{0}\" has no example data to use during request")]
    MissingSecurityExample(String),
    #[error("Security scheme \"{scheme}\" uses the unknown parameter location '{location}'")]
    UnknownParameterLocation { scheme: String, location: String },
    #[error("Security scheme \"{scheme}\" has the unsupported type '{declared}'")]
    UnsupportedSecurityType { scheme: String, declared: String },
    #[error("The Content-Type of \"{0}\" is not supported for requests")]
    UnsupportedContentType(String),
    #[error("Could not resolve the model name from the reference '{0}'")]
    RefResolution(String),
    #[error("Missing field '{0}' in the document")]
    MissingField(String),
    #[error("No adapter accepts the document (swagger: {swagger:?}, openapi: {openapi:?})")]
    UnknownVersion {
        swagger: Option<String>,
        openapi: Option<String>,
    },
}

impl SpecError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::HostNotFound(_)
            | Self::ResourceNotFound(_)
            | Self::SchemaNotFound(_)
            | Self::SecuritySchemeNotFound(_) => ErrorKind::NotFound,
            Self::UnknownType { .. }
            | Self::UnsupportedSecurityType { .. }
            | Self::UnsupportedContentType(_)
            | Self::UnknownVersion { .. } => ErrorKind::Unsupported,
            Self::RefResolution(_) => ErrorKind::RefResolution,
            Self::MissingSecurityExample(_)
            | Self::UnknownParameterLocation { .. }
            | Self::MissingField(_) => ErrorKind::Configuration,
        }
    }
}
