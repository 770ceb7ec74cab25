//! OpenAPI 3.0 layout
//!
//! Hosts come from `servers`, schemas from `components.schemas`, security
//! from `components.securitySchemes`; bodies live under `content` maps keyed
//! by media type.

use serde_json::Value;

use super::common::{
    self, RawOperation, body_schema, ensure_json_request, first_example, header_spec, str_field,
    string_field, substitute_path,
};
use crate::error::SpecError;
use crate::model::{DataType, HeaderMap, Host, Request, Response, SecurityScheme, SecurityType};

const EXAMPLE_KEYS: &[&str] = &["example", "x-example"];

#[derive(Debug, Clone)]
pub struct OpenApiV3 {
    doc: Value,
}

impl OpenApiV3 {
    #[must_use]
    pub fn new(doc: Value) -> Self {
        Self { doc }
    }

    pub(super) fn doc(&self) -> &Value {
        &self.doc
    }

    pub(super) fn schema_table(&self) -> Option<&Value> {
        self.doc.get("components").and_then(|c| c.get("schemas"))
    }

    /// Servers in declared order, named by description or `#index`.
    ///
    /// Server variables are replaced by their defaults.
    pub(super) fn hosts(&self) -> Vec<Host> {
        let Some(servers) = self.doc.get("servers").and_then(Value::as_array) else {
            return Vec::new();
        };

        // Unnamed hosts are numbered by position among usable servers, the
        // same position an index selector resolves against.
        servers
            .iter()
            .filter_map(|server| Some((server, str_field(server, "url")?)))
            .enumerate()
            .map(|(i, (server, url))| {
                let defaults: Vec<(String, String)> = server
                    .get("variables")
                    .and_then(Value::as_object)
                    .map(|vars| {
                        vars.iter()
                            .filter_map(|(k, v)| Some((k.clone(), string_field(v, "default")?)))
                            .collect()
                    })
                    .unwrap_or_default();
                let description = string_field(server, "description");
                Host {
                    name: description.clone().unwrap_or_else(|| format!("#{i}")),
                    url: substitute_path(url, &defaults),
                    description,
                }
            })
            .collect()
    }

    pub(super) fn security(&self, name: &str) -> Result<SecurityScheme, SpecError> {
        let raw = self
            .doc
            .get("components")
            .and_then(|c| c.get("securitySchemes"))
            .and_then(|s| s.get(name))
            .ok_or_else(|| SpecError::SecuritySchemeNotFound(name.to_string()))?;

        let declared = str_field(raw, "type").unwrap_or("(none)");
        let kind = match (declared, str_field(raw, "scheme")) {
            ("apiKey", _) => Some(SecurityType::ApiKey),
            ("http", Some(scheme)) if scheme.eq_ignore_ascii_case("basic") => {
                Some(SecurityType::Basic)
            }
            _ => None,
        }
        .ok_or_else(|| SpecError::UnsupportedSecurityType {
            scheme: name.to_string(),
            declared: declared.to_string(),
        })?;
        common::security_scheme(name, raw, kind, EXAMPLE_KEYS)
    }

    /// Operation-level `in: path` parameters carry the placeholder examples.
    pub(super) fn path_examples(&self, raw: &RawOperation<'_>) -> Vec<(String, String)> {
        parameters(raw.op)
            .filter(|p| str_field(p, "in") == Some("path"))
            .filter_map(|p| Some((string_field(p, "name")?, param_example(p)?)))
            .collect()
    }

    pub(super) fn request_headers(&self, op: &Value) -> Result<HeaderMap, SpecError> {
        let mut headers = HeaderMap::new();
        for param in parameters(op).filter(|p| str_field(p, "in") == Some("header")) {
            let Some(name) = str_field(param, "name") else {
                continue;
            };
            let spec = header_spec(
                name,
                declared_type(param),
                string_field(param, "description"),
                param.get("required").and_then(Value::as_bool).unwrap_or(false),
                param_example(param),
            )?;
            headers.insert(name.to_string(), spec);
        }
        Ok(headers)
    }

    /// One request per `requestBody.content` media type.
    pub(super) fn requests(&self, op: &Value) -> Result<Vec<Request>, SpecError> {
        let Some(content) = op
            .get("requestBody")
            .and_then(|rb| rb.get("content"))
            .and_then(Value::as_object)
        else {
            return Ok(Vec::new());
        };

        let mut requests = Vec::new();
        for (content_type, media) in content {
            ensure_json_request(content_type)?;
            let schema = media.get("schema");
            requests.push(Request {
                data_type: common::map_container_type(schema),
                content_type: content_type.clone(),
                schema: body_schema(self.schema_table(), schema)?,
            });
        }
        Ok(requests)
    }

    pub(super) fn responses(&self, op: &Value) -> Result<Vec<Response>, SpecError> {
        let Some(declared) = op.get("responses").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };

        let mut responses = Vec::new();
        for (key, resp) in declared {
            let Some(status_code) = common::status_code(key) else {
                continue;
            };
            let headers = response_headers(resp)?;

            let content = resp
                .get("content")
                .and_then(Value::as_object)
                .filter(|c| !c.is_empty());
            let Some(content) = content else {
                responses.push(Response {
                    status_code,
                    data_type: DataType::String,
                    content_type: None,
                    schema: None,
                    headers,
                });
                continue;
            };

            for (content_type, media) in content {
                let schema = media.get("schema");
                responses.push(Response {
                    status_code,
                    data_type: common::map_container_type(schema),
                    content_type: Some(content_type.clone()),
                    schema: body_schema(self.schema_table(), schema)?,
                    headers: headers.clone(),
                });
            }
        }
        Ok(responses)
    }
}

fn parameters(op: &Value) -> impl Iterator<Item = &Value> {
    op.get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// `schema.type`, falling back to a bare `type`.
fn declared_type(param: &Value) -> Option<&str> {
    param
        .get("schema")
        .and_then(|s| str_field(s, "type"))
        .or_else(|| str_field(param, "type"))
}

fn param_example(param: &Value) -> Option<String> {
    first_example(param, EXAMPLE_KEYS)
        .or_else(|| param.get("schema").and_then(|s| first_example(s, EXAMPLE_KEYS)))
}

fn response_headers(resp: &Value) -> Result<HeaderMap, SpecError> {
    let mut headers = HeaderMap::new();
    if let Some(declared) = resp.get("headers").and_then(Value::as_object) {
        for (name, h) in declared {
            let spec = header_spec(
                name,
                declared_type(h),
                string_field(h, "description"),
                h.get("required").and_then(Value::as_bool).unwrap_or(false),
                param_example(h),
            )?;
            headers.insert(name.clone(), spec);
        }
    }
    Ok(headers)
}
