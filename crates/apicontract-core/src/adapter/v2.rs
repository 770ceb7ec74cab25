//! Swagger 2.0 layout
//!
//! Hosts come from `schemes` × `host` + `basePath`, schemas from
//! `definitions`, security from `securityDefinitions`. Bodies are `in: body`
//! parameters paired with `consumes`/`produces`.

use serde_json::Value;

use super::common::{
    self, RawOperation, body_schema, ensure_json_request, first_example, header_spec, str_field,
    string_field,
};
use crate::error::SpecError;
use crate::model::{DataType, HeaderMap, Host, Request, Response, SecurityScheme, SecurityType};

const EXAMPLE_KEYS: &[&str] = &["x-example", "example"];
const DEFAULT_MEDIA: &str = "application/json";

#[derive(Debug, Clone)]
pub struct SwaggerV2 {
    doc: Value,
}

impl SwaggerV2 {
    #[must_use]
    pub fn new(doc: Value) -> Self {
        Self { doc }
    }

    pub(super) fn doc(&self) -> &Value {
        &self.doc
    }

    pub(super) fn schema_table(&self) -> Option<&Value> {
        self.doc.get("definitions")
    }

    /// One host per declared scheme, named after the scheme.
    pub(super) fn hosts(&self) -> Vec<Host> {
        let Some(host) = str_field(&self.doc, "host") else {
            return Vec::new();
        };
        let base_path = str_field(&self.doc, "basePath")
            .unwrap_or("")
            .trim_end_matches('/');

        let schemes: Vec<&str> = self
            .doc
            .get("schemes")
            .and_then(Value::as_array)
            .map(|s| s.iter().filter_map(Value::as_str).collect())
            .filter(|s: &Vec<&str>| !s.is_empty())
            .unwrap_or_else(|| vec!["http"]);

        schemes
            .into_iter()
            .map(|scheme| Host {
                name: scheme.to_string(),
                url: format!("{scheme}://{host}{base_path}"),
                description: None,
            })
            .collect()
    }

    pub(super) fn security(&self, name: &str) -> Result<SecurityScheme, SpecError> {
        let raw = self
            .doc
            .get("securityDefinitions")
            .and_then(|defs| defs.get(name))
            .ok_or_else(|| SpecError::SecuritySchemeNotFound(name.to_string()))?;

        let declared = str_field(raw, "type").unwrap_or("(none)");
        let kind = SecurityType::from_declared(declared).ok_or_else(|| {
            SpecError::UnsupportedSecurityType {
                scheme: name.to_string(),
                declared: declared.to_string(),
            }
        })?;
        common::security_scheme(name, raw, kind, EXAMPLE_KEYS)
    }

    /// Path-level parameters carry the examples for `{param}` placeholders.
    pub(super) fn path_examples(&self, raw: &RawOperation<'_>) -> Vec<(String, String)> {
        raw.path_item
            .get("parameters")
            .and_then(Value::as_array)
            .map(|params| {
                params
                    .iter()
                    .filter(|p| str_field(p, "in").is_none_or(|loc| loc == "path"))
                    .filter_map(|p| Some((string_field(p, "name")?, first_example(p, EXAMPLE_KEYS)?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(super) fn request_headers(&self, op: &Value) -> Result<HeaderMap, SpecError> {
        let mut headers = HeaderMap::new();
        for param in parameters(op).filter(|p| str_field(p, "in") == Some("header")) {
            let Some(name) = str_field(param, "name") else {
                continue;
            };
            let spec = header_spec(
                name,
                str_field(param, "type"),
                string_field(param, "description"),
                param.get("required").and_then(Value::as_bool).unwrap_or(false),
                first_example(param, EXAMPLE_KEYS),
            )?;
            headers.insert(name.to_string(), spec);
        }
        Ok(headers)
    }

    /// One request per `consumes` media type of the operation's body parameter.
    pub(super) fn requests(&self, op: &Value) -> Result<Vec<Request>, SpecError> {
        let Some(body) = parameters(op).find(|p| str_field(p, "in") == Some("body")) else {
            return Ok(Vec::new());
        };
        let schema = body.get("schema");

        let mut requests = Vec::new();
        for content_type in self.media_types(op, "consumes") {
            ensure_json_request(&content_type)?;
            requests.push(Request {
                data_type: common::map_container_type(schema),
                content_type,
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

            let Some(schema) = resp.get("schema") else {
                responses.push(Response {
                    status_code,
                    data_type: DataType::String,
                    content_type: None,
                    schema: None,
                    headers,
                });
                continue;
            };

            let resolved = body_schema(self.schema_table(), Some(schema))?;
            for content_type in self.media_types(op, "produces") {
                responses.push(Response {
                    status_code,
                    data_type: common::map_container_type(Some(schema)),
                    content_type: Some(content_type),
                    schema: resolved.clone(),
                    headers: headers.clone(),
                });
            }
        }
        Ok(responses)
    }

    /// Operation-level media types, then document-level, then JSON.
    fn media_types(&self, op: &Value, key: &str) -> Vec<String> {
        let declared = |v: &Value| -> Option<Vec<String>> {
            let types: Vec<String> = v
                .get(key)?
                .as_array()?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            (!types.is_empty()).then_some(types)
        };
        declared(op)
            .or_else(|| declared(&self.doc))
            .unwrap_or_else(|| vec![DEFAULT_MEDIA.to_string()])
    }
}

fn parameters(op: &Value) -> impl Iterator<Item = &Value> {
    op.get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn response_headers(resp: &Value) -> Result<HeaderMap, SpecError> {
    let mut headers = HeaderMap::new();
    if let Some(declared) = resp.get("headers").and_then(Value::as_object) {
        for (name, h) in declared {
            let spec = header_spec(
                name,
                str_field(h, "type"),
                string_field(h, "description"),
                h.get("x-required").and_then(Value::as_bool).unwrap_or(false),
                first_example(h, EXAMPLE_KEYS),
            )?;
            headers.insert(name.clone(), spec);
        }
    }
    Ok(headers)
}
