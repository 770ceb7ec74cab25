//! Structured progress events and the reporter seam
//!
//! The runner only emits [`Event`] values; rendering them is the caller's
//! business.

use apicontract_core::{ErrorKind, Host, HttpMethod, ProjectInfo, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::Diagnostic;

/// Operation listed for discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceSummary {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
}

impl From<&Resource> for ResourceSummary {
    fn from(res: &Resource) -> Self {
        Self {
            name: res.name.clone(),
            method: res.method,
            path: res.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    TestingProject {
        project: ProjectInfo,
    },
    /// No host was requested, the first one is used
    UsingDefaultHost,
    UsingHost {
        host: Host,
    },
    TestingResource {
        resource: ResourceSummary,
    },
    UsingSecurity {
        scheme: String,
    },
    UsingRequest {
        content_type: String,
    },
    UsingResponse {
        status_code: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<String>,
    },
    Overriding {
        field: String,
        value: String,
    },
    Diagnostic {
        diagnostic: Diagnostic,
    },
    AvailableResources {
        resources: Vec<ResourceSummary>,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
    ResourceOk {
        name: String,
    },
    ResourceFail {
        name: String,
    },
}

/// Consumer of run events.
pub trait Reporter {
    fn report(&mut self, event: Event);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: Event) {
        (**self).report(event);
    }
}

/// Keeps every event in order.
impl Reporter for Vec<Event> {
    fn report(&mut self, event: Event) {
        self.push(event);
    }
}

/// Machine-readable outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub passed: bool,
    /// Resource under test, when one was selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub events: Vec<Event>,
}

impl RunReport {
    #[must_use]
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Diagnostic { diagnostic } => Some(diagnostic),
                _ => None,
            })
            .collect()
    }

    /// First hard error of the run, if it was aborted.
    #[must_use]
    pub fn error(&self) -> Option<(ErrorKind, &str)> {
        self.events.iter().find_map(|e| match e {
            Event::Error { kind, message } => Some((*kind, message.as_str())),
            _ => None,
        })
    }
}

/// JSON Schema for [`RunReport`], the `--output json` format.
///
/// # Errors
///
/// Returns error if the generated schema cannot be serialized.
pub fn generate_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(RunReport);
    serde_json::to_string_pretty(&schema)
}
