//! apicontract-core: Canonical contract model and spec adapters
//!
//! This crate turns Swagger 2.0 and OpenAPI 3.0 documents into one
//! version-independent model of hosts, resources, schemas and security
//! schemes that the runner validates live responses against.

pub mod adapter;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod overrides;
pub mod registry;

pub use adapter::{SpecAdapter, SpecVersion};
pub use config::{ANY_CONTENT_TYPE, Config, ConfigError, DEFAULT_CONFIG_FILES};
pub use error::{ErrorKind, SpecError};
pub use loader::LoadError;
pub use model::{
    DataType, HeaderMap, HeaderSpec, Host, HostSelector, HttpMethod, ParamLocation, ProjectInfo,
    Property, Request, Resource, Response, Schema, SecurityScheme, SecurityType,
};
pub use overrides::{OverriddenField, Override, SecurityOverride};
pub use registry::{AdapterRegistry, Fingerprint};
