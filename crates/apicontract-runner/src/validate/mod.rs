//! Structural validation of a live response against the canonical model
//!
//! No I/O. Validators never short-circuit: every check runs, every
//! mismatch is pushed into the caller's accumulator, and the boolean
//! result is the AND over all of them.

mod diagnostic;

pub use diagnostic::Diagnostic;

use apicontract_core::{DataType, HeaderSpec, Property, Response, Schema};
use serde_json::Value;

use crate::error::RunError;
use crate::transport::HttpResponse;
use crate::typetest;

/// Root of every diagnostic path.
pub const ROOT: &str = "$";

const JSON: &str = "application/json";

/// Validate one property value read off its owner.
///
/// JSON `null` counts as absent. A missing required value yields exactly
/// one [`Diagnostic::PropertyMissing`]; a missing optional value passes
/// regardless of type.
pub fn validate_property(
    property: &Property,
    value: Option<&Value>,
    at: &str,
    out: &mut Vec<Diagnostic>,
) -> bool {
    let path = format!("{at}.{}", property.name);

    let Some(value) = value.filter(|v| !v.is_null()) else {
        if property.required {
            out.push(Diagnostic::PropertyMissing { path });
            return false;
        }
        return true;
    };

    if !typetest::accepts(property.data_type, value) {
        out.push(Diagnostic::PropertyType {
            path,
            expected: property.data_type,
            actual: typetest::kind_of(value).to_string(),
        });
        return false;
    }

    match (&property.schema, value) {
        (Some(schema), Value::Object(_)) => validate_schema(schema, value, &path, out),
        (Some(schema), Value::Array(items)) => validate_items(schema, items, &path, out),
        _ => true,
    }
}

/// Validate every declared property of `schema` against `value`.
///
/// `value` is expected to be an object; callers check that first.
pub fn validate_schema(schema: &Schema, value: &Value, at: &str, out: &mut Vec<Diagnostic>) -> bool {
    let mut ok = true;
    for property in &schema.properties {
        ok &= validate_property(property, value.get(&property.name), at, out);
    }
    ok
}

/// Every element must be an object satisfying `schema`; one bad element
/// fails the whole array, but all elements are still checked.
pub fn validate_items(schema: &Schema, items: &[Value], at: &str, out: &mut Vec<Diagnostic>) -> bool {
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        let path = format!("{at}[{i}]");
        if item.is_object() {
            ok &= validate_schema(schema, item, &path, out);
        } else {
            out.push(Diagnostic::ExpectedObject {
                path,
                actual: typetest::kind_of(item).to_string(),
            });
            ok = false;
        }
    }
    ok
}

/// Validate a declared response header. Names match case-insensitively.
pub fn validate_header(spec: &HeaderSpec, response: &HttpResponse, out: &mut Vec<Diagnostic>) -> bool {
    match response.header(&spec.name) {
        None if spec.required => {
            out.push(Diagnostic::HeaderMissing {
                name: spec.name.clone(),
            });
            false
        }
        None => true,
        Some(text) if typetest::accepts_text(spec.data_type, text) => true,
        Some(text) => {
            out.push(Diagnostic::HeaderType {
                name: spec.name.clone(),
                expected: spec.data_type,
                value: text.to_string(),
            });
            false
        }
    }
}

/// How a response body is checked, decided once per expected [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Status, content type and headers only
    Plain,
    /// JSON array, each element checked against the item schema
    JsonArray,
    /// Single JSON object checked against the schema
    JsonObject,
}

impl ResponseShape {
    /// # Errors
    ///
    /// Returns [`RunError::UnknownResponseShape`] for a JSON content type
    /// whose body type is neither array nor object.
    pub fn from_response(response: &Response) -> Result<Self, RunError> {
        let Some(content_type) = response.content_type.as_deref() else {
            return Ok(Self::Plain);
        };
        if media_type(content_type) != JSON {
            return Ok(Self::Plain);
        }
        match response.data_type {
            DataType::Array => Ok(Self::JsonArray),
            DataType::Object => Ok(Self::JsonObject),
            other => Err(RunError::UnknownResponseShape {
                content_type: content_type.to_string(),
                data_type: other,
            }),
        }
    }
}

/// Validate a live response against the expected one.
///
/// Headers, status and content type are always checked. JSON shapes then
/// parse the body and check its structure even if a base check failed.
pub fn validate_response(
    spec: &Response,
    shape: ResponseShape,
    response: &HttpResponse,
    out: &mut Vec<Diagnostic>,
) -> bool {
    let mut ok = true;

    for header in spec.headers.values() {
        ok &= validate_header(header, response, out);
    }

    if response.status != spec.status_code {
        out.push(Diagnostic::StatusMismatch {
            expected: spec.status_code,
            actual: response.status,
        });
        ok = false;
    }

    if let Some(expected) = spec.content_type.as_deref() {
        let actual = response.content_type();
        if actual.is_none_or(|a| media_type(a) != media_type(expected)) {
            out.push(Diagnostic::ContentTypeMismatch {
                expected: expected.to_string(),
                actual: actual.map(str::to_string),
            });
            ok = false;
        }
    }

    if shape == ResponseShape::Plain {
        return ok;
    }

    let Some(body) = parse_body(&response.body, out) else {
        return false;
    };

    let body_ok = match (shape, &body) {
        (ResponseShape::JsonArray, Value::Array(items)) => spec
            .schema
            .as_ref()
            .is_none_or(|schema| validate_items(schema, items, ROOT, out)),
        (ResponseShape::JsonArray, other) => {
            out.push(Diagnostic::ExpectedArray {
                path: ROOT.to_string(),
                actual: typetest::kind_of(other).to_string(),
            });
            false
        }
        (_, Value::Object(_)) => spec
            .schema
            .as_ref()
            .is_none_or(|schema| validate_schema(schema, &body, ROOT, out)),
        (_, other) => {
            out.push(Diagnostic::ExpectedObject {
                path: ROOT.to_string(),
                actual: typetest::kind_of(other).to_string(),
            });
            false
        }
    };

    ok && body_ok
}

fn parse_body(body: &str, out: &mut Vec<Diagnostic>) -> Option<Value> {
    if body.trim().is_empty() {
        out.push(Diagnostic::EmptyBody);
        return None;
    }
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            out.push(Diagnostic::MalformedBody {
                error: e.to_string(),
            });
            None
        }
    }
}

/// Lowercased media type without parameters: "Application/JSON; charset=utf-8"
/// becomes "application/json".
#[must_use]
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicontract_core::HeaderMap;
    use serde_json::json;

    fn prop(name: &str, data_type: DataType, required: bool) -> Property {
        Property {
            name: name.into(),
            data_type,
            description: None,
            required,
            schema: None,
        }
    }

    fn widget() -> Schema {
        Schema {
            name: "Widget".into(),
            description: None,
            properties: vec![
                prop("id", DataType::Number, true),
                prop("name", DataType::String, false),
            ],
            example: Some(json!({"id": 1, "name": "sprocket"})),
        }
    }

    fn json_response(data_type: DataType) -> Response {
        Response {
            status_code: 200,
            data_type,
            content_type: Some("application/json".into()),
            schema: Some(widget()),
            headers: HeaderMap::new(),
        }
    }

    fn live(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    // ── Property ──

    #[test]
    fn required_absent_yields_one_missing_diagnostic() {
        let mut out = Vec::new();
        assert!(!validate_property(&prop("id", DataType::Number, true), None, ROOT, &mut out));
        assert_eq!(out, vec![Diagnostic::PropertyMissing { path: "$.id".into() }]);
    }

    #[test]
    fn null_counts_as_absent() {
        let mut out = Vec::new();
        let optional = prop("name", DataType::String, false);
        assert!(validate_property(&optional, Some(&Value::Null), ROOT, &mut out));
        assert!(out.is_empty());

        let required = prop("id", DataType::Number, true);
        assert!(!validate_property(&required, Some(&Value::Null), ROOT, &mut out));
        assert!(matches!(out[0], Diagnostic::PropertyMissing { .. }));
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut out = Vec::new();
        let ok = validate_property(
            &prop("id", DataType::Number, true),
            Some(&json!("x")),
            "$[0]",
            &mut out,
        );
        assert!(!ok);
        assert_eq!(
            out,
            vec![Diagnostic::PropertyType {
                path: "$[0].id".into(),
                expected: DataType::Number,
                actual: "string".into(),
            }]
        );
    }

    #[test]
    fn nested_schemas_are_checked() {
        let part = Schema {
            name: "Part".into(),
            description: None,
            properties: vec![prop("sku", DataType::String, true)],
            example: None,
        };
        let parts = Property {
            schema: Some(Box::new(part)),
            ..prop("parts", DataType::Array, false)
        };
        let mut out = Vec::new();
        let ok = validate_property(
            &parts,
            Some(&json!([{"sku": "a"}, {"sku": 3}, "loose"])),
            ROOT,
            &mut out,
        );
        assert!(!ok);
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], Diagnostic::PropertyType { path, .. } if path == "$.parts[1].sku"));
        assert!(matches!(&out[1], Diagnostic::ExpectedObject { path, .. } if path == "$.parts[2]"));
    }

    // ── Schema ──

    #[test]
    fn schema_accumulates_per_property() {
        let mut out = Vec::new();
        let ok = validate_schema(&widget(), &json!({"name": 5}), ROOT, &mut out);
        assert!(!ok);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn schema_example_validates_against_itself() {
        let schema = widget();
        let mut out = Vec::new();
        assert!(validate_schema(&schema, schema.example.as_ref().unwrap(), ROOT, &mut out));
        assert!(out.is_empty());
    }

    // ── Header ──

    #[test]
    fn header_checks() {
        let spec = HeaderSpec {
            name: "X-Total-Count".into(),
            data_type: DataType::Number,
            description: None,
            required: true,
            example: None,
        };
        let mut out = Vec::new();

        let resp = HttpResponse::new(200).with_header("x-total-count", "12");
        assert!(validate_header(&spec, &resp, &mut out));

        let resp = HttpResponse::new(200).with_header("X-Total-Count", "many");
        assert!(!validate_header(&spec, &resp, &mut out));

        assert!(!validate_header(&spec, &HttpResponse::new(200), &mut out));
        assert!(matches!(out[0], Diagnostic::HeaderType { .. }));
        assert!(matches!(out[1], Diagnostic::HeaderMissing { .. }));

        let optional = HeaderSpec {
            required: false,
            ..spec
        };
        assert!(validate_header(&optional, &HttpResponse::new(200), &mut out));
        assert_eq!(out.len(), 2);
    }

    // ── Shape ──

    #[test]
    fn shape_dispatch() {
        assert_eq!(
            ResponseShape::from_response(&json_response(DataType::Array)).unwrap(),
            ResponseShape::JsonArray
        );
        assert_eq!(
            ResponseShape::from_response(&json_response(DataType::Object)).unwrap(),
            ResponseShape::JsonObject
        );

        let plain = Response {
            content_type: None,
            ..json_response(DataType::String)
        };
        assert_eq!(ResponseShape::from_response(&plain).unwrap(), ResponseShape::Plain);

        let text = Response {
            content_type: Some("text/plain".into()),
            ..json_response(DataType::String)
        };
        assert_eq!(ResponseShape::from_response(&text).unwrap(), ResponseShape::Plain);

        let err = ResponseShape::from_response(&json_response(DataType::String)).unwrap_err();
        assert!(matches!(err, RunError::UnknownResponseShape { .. }));
    }

    // ── Response ──

    #[test]
    fn array_response_passes() {
        let spec = json_response(DataType::Array);
        let mut out = Vec::new();
        let ok = validate_response(
            &spec,
            ResponseShape::JsonArray,
            &live(200, r#"[{"id": 1, "name": "a"}, {"id": 2}]"#),
            &mut out,
        );
        assert!(ok, "{out:?}");
    }

    #[test]
    fn array_response_fails_on_any_element() {
        let spec = json_response(DataType::Array);
        let mut out = Vec::new();
        let ok = validate_response(
            &spec,
            ResponseShape::JsonArray,
            &live(200, r#"[{"id": 1}, {"id": "x"}]"#),
            &mut out,
        );
        assert!(!ok);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn array_expected_but_object_received() {
        let spec = json_response(DataType::Array);
        let mut out = Vec::new();
        assert!(!validate_response(
            &spec,
            ResponseShape::JsonArray,
            &live(200, r#"{"id": 1}"#),
            &mut out
        ));
        assert_eq!(
            out,
            vec![Diagnostic::ExpectedArray {
                path: "$".into(),
                actual: "object".into()
            }]
        );
    }

    #[test]
    fn base_checks_do_not_short_circuit() {
        let mut spec = json_response(DataType::Object);
        spec.headers.insert(
            "X-Trace".into(),
            HeaderSpec {
                name: "X-Trace".into(),
                data_type: DataType::String,
                description: None,
                required: true,
                example: None,
            },
        );
        let resp = HttpResponse::new(500)
            .with_header("Content-Type", "text/html")
            .with_body(r#"{"name": 1}"#);
        let mut out = Vec::new();

        assert!(!validate_response(&spec, ResponseShape::JsonObject, &resp, &mut out));
        let kinds: Vec<_> = out
            .iter()
            .map(|d| serde_json::to_value(d).unwrap()["kind"].clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                json!("headerMissing"),
                json!("statusMismatch"),
                json!("contentTypeMismatch"),
                json!("propertyMissing"),
                json!("propertyType"),
            ]
        );
    }

    #[test]
    fn content_type_parameters_and_case_are_ignored() {
        let spec = json_response(DataType::Object);
        let resp = HttpResponse::new(200)
            .with_header("content-type", "Application/JSON; charset=utf-8")
            .with_body(r#"{"id": 3}"#);
        let mut out = Vec::new();
        assert!(validate_response(&spec, ResponseShape::JsonObject, &resp, &mut out));
    }

    #[test]
    fn empty_and_malformed_bodies_are_distinct() {
        let spec = json_response(DataType::Object);

        let mut out = Vec::new();
        assert!(!validate_response(&spec, ResponseShape::JsonObject, &live(200, ""), &mut out));
        assert_eq!(out, vec![Diagnostic::EmptyBody]);

        let mut out = Vec::new();
        assert!(!validate_response(&spec, ResponseShape::JsonObject, &live(200, "{nope"), &mut out));
        assert!(matches!(out[0], Diagnostic::MalformedBody { .. }));
    }

    #[test]
    fn plain_response_ignores_body() {
        let spec = Response {
            status_code: 404,
            data_type: DataType::String,
            content_type: None,
            schema: None,
            headers: HeaderMap::new(),
        };
        let resp = HttpResponse::new(404).with_body("not json at all");
        let mut out = Vec::new();
        assert!(validate_response(&spec, ResponseShape::Plain, &resp, &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn media_type_normalization() {
        assert_eq!(media_type("Application/JSON; charset=utf-8"), "application/json");
        assert_eq!(media_type(" text/plain "), "text/plain");
    }
}
