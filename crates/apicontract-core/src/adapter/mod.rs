//! Spec adapters: raw Swagger/OpenAPI document → canonical model
//!
//! Both versions answer the same questions; they only differ in where the
//! answers live in the raw document. Everything is resolved per call, so
//! nothing is converted up front and the produced values never point back
//! into the document.

mod common;
mod v2;
mod v3;

use serde_json::Value;

pub use common::{map_container_type, ref_name, resolve_schema_ref, substitute_path};
pub use v2::SwaggerV2;
pub use v3::OpenApiV3;

use common::{RawOperation, str_field};

use crate::error::SpecError;
use crate::model::{
    HeaderMap, Host, HostSelector, ProjectInfo, Request, Resource, Response, Schema,
    SecurityScheme,
};

/// Contract format a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    Swagger2,
    OpenApi3,
}

impl std::fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Swagger2 => "Swagger 2.0",
            Self::OpenApi3 => "OpenAPI 3.0",
        })
    }
}

/// A versioned view over a raw document.
#[derive(Debug, Clone)]
pub enum SpecAdapter {
    V2(SwaggerV2),
    V3(OpenApiV3),
}

impl SpecAdapter {
    #[must_use]
    pub fn new(version: SpecVersion, doc: Value) -> Self {
        match version {
            SpecVersion::Swagger2 => Self::V2(SwaggerV2::new(doc)),
            SpecVersion::OpenApi3 => Self::V3(OpenApiV3::new(doc)),
        }
    }

    #[must_use]
    pub const fn version(&self) -> SpecVersion {
        match self {
            Self::V2(_) => SpecVersion::Swagger2,
            Self::V3(_) => SpecVersion::OpenApi3,
        }
    }

    fn doc(&self) -> &Value {
        match self {
            Self::V2(s) => s.doc(),
            Self::V3(s) => s.doc(),
        }
    }

    fn schema_table(&self) -> Option<&Value> {
        match self {
            Self::V2(s) => s.schema_table(),
            Self::V3(s) => s.schema_table(),
        }
    }

    #[must_use]
    pub fn project_info(&self) -> ProjectInfo {
        let info = self.doc().get("info").unwrap_or(&Value::Null);
        let field = |key| str_field(info, key).unwrap_or_default().to_string();
        ProjectInfo {
            title: field("title"),
            description: field("description"),
            version: field("version"),
        }
    }

    #[must_use]
    pub fn hosts(&self) -> Vec<Host> {
        match self {
            Self::V2(s) => s.hosts(),
            Self::V3(s) => s.hosts(),
        }
    }

    /// # Errors
    ///
    /// [`SpecError::HostNotFound`] if no host has that name or the index is
    /// out of bounds.
    pub fn host(&self, selector: &HostSelector) -> Result<Host, SpecError> {
        let hosts = self.hosts();
        let found = match selector {
            HostSelector::Name(name) => hosts.into_iter().find(|h| h.name == *name),
            HostSelector::Index(index) => hosts.into_iter().nth(*index),
        };
        found.ok_or_else(|| SpecError::HostNotFound(selector.to_string()))
    }

    /// # Errors
    ///
    /// [`SpecError::SchemaNotFound`] or [`SpecError::UnknownType`].
    pub fn schema(&self, name: &str) -> Result<Schema, SpecError> {
        common::build_schema(self.schema_table(), name, &mut Vec::new())
    }

    /// `None` name (or empty) means the operation carries no security.
    ///
    /// # Errors
    ///
    /// Fails if the scheme is absent, has no example, or declares a location
    /// other than query/header/cookie.
    pub fn security(&self, name: Option<&str>) -> Result<Option<SecurityScheme>, SpecError> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        let scheme = match self {
            Self::V2(s) => s.security(name)?,
            Self::V3(s) => s.security(name)?,
        };
        Ok(Some(scheme))
    }

    /// First operation, in document order, whose display name is `name`.
    ///
    /// # Errors
    ///
    /// [`SpecError::ResourceNotFound`], or any error raised while resolving
    /// the matched operation.
    pub fn resource(&self, name: &str) -> Result<Resource, SpecError> {
        common::operations(self.doc())
            .into_iter()
            .find(|raw| raw.display_name() == name)
            .map(|raw| self.build_resource(&raw))
            .unwrap_or_else(|| Err(SpecError::ResourceNotFound(name.to_string())))
    }

    /// # Errors
    ///
    /// The first error raised while resolving any operation.
    pub fn resources(&self) -> Result<Vec<Resource>, SpecError> {
        common::operations(self.doc())
            .iter()
            .map(|raw| self.build_resource(raw))
            .collect()
    }

    /// # Errors
    ///
    /// [`SpecError::UnsupportedContentType`] for non-JSON bodies, or schema
    /// resolution errors.
    pub fn requests(&self, operation: &Value) -> Result<Vec<Request>, SpecError> {
        match self {
            Self::V2(s) => s.requests(operation),
            Self::V3(s) => s.requests(operation),
        }
    }

    /// # Errors
    ///
    /// Schema resolution errors for any declared body.
    pub fn responses(&self, operation: &Value) -> Result<Vec<Response>, SpecError> {
        match self {
            Self::V2(s) => s.responses(operation),
            Self::V3(s) => s.responses(operation),
        }
    }

    fn build_resource(&self, raw: &RawOperation<'_>) -> Result<Resource, SpecError> {
        let examples = match self {
            Self::V2(s) => s.path_examples(raw),
            Self::V3(s) => s.path_examples(raw),
        };
        let headers: HeaderMap = match self {
            Self::V2(s) => s.request_headers(raw.op)?,
            Self::V3(s) => s.request_headers(raw.op)?,
        };
        let security_name = common::security_name(self.doc(), raw.op);

        Ok(Resource {
            name: raw.display_name(),
            path: substitute_path(raw.path, &examples),
            method: raw.method,
            headers,
            security: self.security(security_name.as_deref())?,
            requests: self.requests(raw.op)?,
            responses: self.responses(raw.op)?,
        })
    }
}
