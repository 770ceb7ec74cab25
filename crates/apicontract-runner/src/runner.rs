//! One end-to-end contract test
//!
//! SelectHost → SelectResource → BuildRequest → SelectResponseSpec →
//! Authorize → Send → Validate → Report. Every step but Validate aborts
//! the run on failure; Validate always runs to completion.

use apicontract_core::{
    ANY_CONTENT_TYPE, Config, Host, HostSelector, HttpMethod, Override, Request, Resource,
    Response, SpecAdapter, SpecError,
};

use crate::error::RunError;
use crate::report::{Event, Reporter, ResourceSummary, RunReport};
use crate::security;
use crate::transport::{HttpRequest, Transport};
use crate::validate::{self, ResponseShape};

/// What to test and which contract variants to test it against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    /// First host when unset
    pub host: Option<HostSelector>,
    pub resource: Option<String>,
    /// `*` = first declared
    pub request_content_type: String,
    /// 0 = any
    pub response_status: u16,
    /// `*` = any
    pub response_content_type: String,
}

impl Default for TestPlan {
    fn default() -> Self {
        Self {
            host: None,
            resource: None,
            request_content_type: ANY_CONTENT_TYPE.to_string(),
            response_status: 0,
            response_content_type: ANY_CONTENT_TYPE.to_string(),
        }
    }
}

impl TestPlan {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host.as_deref().map(HostSelector::from),
            resource: config.resource.clone(),
            request_content_type: config.request_content_type.clone(),
            response_status: config.response_status,
            response_content_type: config.response_content_type.clone(),
        }
    }
}

/// Contract tester for a single resource
pub struct Runner<T> {
    spec: SpecAdapter,
    transport: T,
    plan: TestPlan,
    overrides: Override,
}

impl<T: Transport> Runner<T> {
    #[must_use]
    pub fn new(spec: SpecAdapter, transport: T) -> Self {
        Self {
            spec,
            transport,
            plan: TestPlan::default(),
            overrides: Override::default(),
        }
    }

    #[must_use]
    pub fn from_config(spec: SpecAdapter, transport: T, config: &Config) -> Self {
        Self::new(spec, transport)
            .with_plan(TestPlan::from_config(config))
            .with_overrides(config.overrides.clone())
    }

    #[must_use]
    pub fn with_plan(mut self, plan: TestPlan) -> Self {
        self.plan = plan;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: Option<HostSelector>) -> Self {
        self.plan.host = host;
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.plan.resource = Some(resource.into());
        self
    }

    #[must_use]
    pub fn with_request_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.plan.request_content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn with_response_status(mut self, status: u16) -> Self {
        self.plan.response_status = status;
        self
    }

    #[must_use]
    pub fn with_response_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.plan.response_content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Override) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub const fn spec(&self) -> &SpecAdapter {
        &self.spec
    }

    #[must_use]
    pub const fn plan(&self) -> &TestPlan {
        &self.plan
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the test and collect every event.
    #[must_use]
    pub fn execute(&self) -> RunReport {
        let mut events = Vec::new();
        let passed = self.run(&mut events);
        RunReport {
            passed,
            resource: self.plan.resource.clone(),
            events,
        }
    }

    /// Run the test, streaming events to `reporter`. Returns the verdict.
    pub fn run(&self, reporter: &mut dyn Reporter) -> bool {
        reporter.report(Event::TestingProject {
            project: self.spec.project_info(),
        });

        let host = match self.select_host(reporter) {
            Ok(host) => host,
            Err(e) => {
                abort(reporter, &e);
                return false;
            }
        };
        reporter.report(Event::UsingHost { host: host.clone() });

        let resource = match self.select_resource() {
            Ok(resource) => resource,
            Err(e) => {
                abort(reporter, &e);
                if matches!(
                    e,
                    RunError::NoResourceSelected | RunError::Spec(SpecError::ResourceNotFound(_))
                ) {
                    self.list_resources(reporter);
                }
                return false;
            }
        };
        reporter.report(Event::TestingResource {
            resource: ResourceSummary::from(&resource),
        });

        let passed = match self.test_resource(&host, &resource, reporter) {
            Ok(passed) => passed,
            Err(e) => {
                abort(reporter, &e);
                false
            }
        };

        let name = resource.name;
        reporter.report(if passed {
            Event::ResourceOk { name }
        } else {
            Event::ResourceFail { name }
        });
        passed
    }

    fn select_host(&self, reporter: &mut dyn Reporter) -> Result<Host, RunError> {
        let selector = match &self.plan.host {
            Some(selector) => selector.clone(),
            None => {
                reporter.report(Event::UsingDefaultHost);
                HostSelector::Index(0)
            }
        };
        Ok(self.spec.host(&selector)?)
    }

    fn select_resource(&self) -> Result<Resource, RunError> {
        let name = self
            .plan
            .resource
            .as_deref()
            .ok_or(RunError::NoResourceSelected)?;
        Ok(self.spec.resource(name)?)
    }

    fn list_resources(&self, reporter: &mut dyn Reporter) {
        match self.spec.resources() {
            Ok(resources) => reporter.report(Event::AvailableResources {
                resources: resources.iter().map(ResourceSummary::from).collect(),
            }),
            Err(e) => abort(reporter, &e.into()),
        }
    }

    fn test_resource(
        &self,
        host: &Host,
        resource: &Resource,
        reporter: &mut dyn Reporter,
    ) -> Result<bool, RunError> {
        if let Some(scheme) = &resource.security {
            reporter.report(Event::UsingSecurity {
                scheme: scheme.name.clone(),
            });
        }

        // BuildRequest
        let mut request = HttpRequest::new(resource.method, format!("{}{}", host.url, resource.path));
        if resource.method == HttpMethod::Post {
            let variant = self.select_request(resource)?;
            reporter.report(Event::UsingRequest {
                content_type: variant.content_type.clone(),
            });
            let example = variant
                .schema
                .as_ref()
                .and_then(|s| s.example.as_ref())
                .ok_or_else(|| {
                    RunError::NoExampleAvailable(
                        variant
                            .schema
                            .as_ref()
                            .map_or_else(|| resource.name.clone(), |s| s.name.clone()),
                    )
                })?;
            let body = serde_json::to_string(example).map_err(|e| RunError::Body(e.to_string()))?;
            request.set_header("Content-Type", variant.content_type.as_str());
            request.body = Some(body);
        }
        for header in resource.headers.values() {
            match &header.example {
                Some(value) => request.set_header(&header.name, value.as_str()),
                None if header.required => {
                    return Err(RunError::MissingHeaderExample(header.name.clone()));
                }
                None => {}
            }
        }

        // SelectResponseSpec
        let expected = self.select_response(resource)?;
        let shape = ResponseShape::from_response(expected)?;
        reporter.report(Event::UsingResponse {
            status_code: expected.status_code,
            content_type: expected.content_type.clone(),
            schema: expected.schema.as_ref().map(|s| s.name.clone()),
        });

        // Authorize
        let mut scheme = resource.security.clone();
        for field in security::apply_override(scheme.as_mut(), self.overrides.security.as_ref()) {
            reporter.report(Event::Overriding {
                field: field.field,
                value: field.value,
            });
        }
        security::authorize(scheme.as_ref(), &mut request)?;

        // Send
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(&request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");

        // Validate
        let mut diagnostics = Vec::new();
        let passed = validate::validate_response(expected, shape, &response, &mut diagnostics);
        for diagnostic in diagnostics {
            reporter.report(Event::Diagnostic { diagnostic });
        }
        Ok(passed)
    }

    fn select_request<'r>(&self, resource: &'r Resource) -> Result<&'r Request, RunError> {
        let wanted = self.plan.request_content_type.as_str();
        let found = if wanted == ANY_CONTENT_TYPE {
            resource.requests.first()
        } else {
            let wanted = validate::media_type(wanted);
            resource
                .requests
                .iter()
                .find(|r| validate::media_type(&r.content_type) == wanted)
        };
        found.ok_or_else(|| RunError::NoMatchingRequest(self.plan.request_content_type.clone()))
    }

    fn select_response<'r>(&self, resource: &'r Resource) -> Result<&'r Response, RunError> {
        let status = self.plan.response_status;
        let content_type = self.plan.response_content_type.as_str();
        let wanted = (content_type != ANY_CONTENT_TYPE).then(|| validate::media_type(content_type));

        resource
            .responses
            .iter()
            .find(|r| {
                let status_ok = status == 0 || r.status_code == status;
                let content_ok = wanted.as_ref().is_none_or(|w| {
                    r.content_type
                        .as_deref()
                        .is_some_and(|ct| validate::media_type(ct) == *w)
                });
                status_ok && content_ok
            })
            .ok_or_else(|| RunError::NoMatchingResponse {
                status,
                content_type: content_type.to_string(),
            })
    }
}

fn abort(reporter: &mut dyn Reporter, error: &RunError) {
    tracing::debug!(kind = %error.kind(), "run aborted: {error}");
    reporter.report(Event::Error {
        kind: error.kind(),
        message: error.to_string(),
    });
}
