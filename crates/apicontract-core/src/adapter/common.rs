//! Helpers shared by both document versions
//!
//! Everything here reads a raw `serde_json::Value` and is free of
//! version-specific layout knowledge: where a table or parameter lives is
//! decided by the caller.

use serde_json::Value;

use crate::error::SpecError;
use crate::model::{
    DataType, HeaderSpec, HttpMethod, ParamLocation, Property, Schema, SecurityScheme,
    SecurityType,
};

/// A declared operation together with where it was found.
pub(super) struct RawOperation<'a> {
    pub(super) path: &'a str,
    pub(super) path_item: &'a Value,
    pub(super) method: HttpMethod,
    pub(super) op: &'a Value,
}

impl RawOperation<'_> {
    /// `summary`, then `operationId`, then "METHOD /path".
    pub(super) fn display_name(&self) -> String {
        str_field(self.op, "summary")
            .or_else(|| str_field(self.op, "operationId"))
            .map_or_else(|| format!("{} {}", self.method, self.path), str::to_string)
    }
}

/// Every path × {get, post, put, delete} operation, in document order.
pub(super) fn operations(doc: &Value) -> Vec<RawOperation<'_>> {
    let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut ops = Vec::new();
    for (path, path_item) in paths {
        for method in HttpMethod::ALL {
            if let Some(op) = path_item.get(method.key()) {
                ops.push(RawOperation {
                    path,
                    path_item,
                    method,
                    op,
                });
            }
        }
    }
    ops
}

pub(super) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

pub(super) fn string_field(value: &Value, key: &str) -> Option<String> {
    str_field(value, key).map(str::to_string)
}

/// Mandatory string field; `at` names the location for the error.
pub(super) fn require_str<'a>(value: &'a Value, key: &str, at: &str) -> Result<&'a str, SpecError> {
    str_field(value, key).ok_or_else(|| SpecError::MissingField(format!("{at}.{key}")))
}

/// Scalar example rendered as text: strings verbatim, numbers and booleans
/// through their JSON form.
pub(super) fn example_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First example-ish field found on `value`, in `keys` order.
pub(super) fn first_example(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| value.get(*k).and_then(example_text))
}

/// Container type of a body schema node.
///
/// `type: array` → Array, a direct `$ref` → Object, anything else
/// (including no schema at all) → String.
#[must_use]
pub fn map_container_type(schema: Option<&Value>) -> DataType {
    match schema {
        Some(s) if str_field(s, "type") == Some("array") => DataType::Array,
        Some(s) if s.get("$ref").is_some() => DataType::Object,
        _ => DataType::String,
    }
}

/// Name of the schema a body node points at, if any.
///
/// Arrays point at their `items.$ref`, objects at their own `$ref`.
///
/// # Errors
///
/// Returns [`SpecError::RefResolution`] when the reference has no
/// name-shaped suffix.
pub fn resolve_schema_ref(schema: Option<&Value>) -> Result<Option<String>, SpecError> {
    let reference = match (map_container_type(schema), schema) {
        (DataType::Array, Some(s)) => s.get("items").and_then(|i| str_field(i, "$ref")),
        (DataType::Object, Some(s)) => str_field(s, "$ref"),
        _ => None,
    };
    reference.map(ref_name).transpose()
}

/// Bare schema name at the end of a reference string.
///
/// `#/components/schemas/Widget` → `Widget`.
///
/// # Errors
///
/// Returns [`SpecError::RefResolution`] if the reference does not end in
/// word characters.
pub fn ref_name(reference: &str) -> Result<String, SpecError> {
    let start = reference
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i);

    match start {
        Some(i) => Ok(reference[i..].to_string()),
        None => Err(SpecError::RefResolution(reference.to_string())),
    }
}

/// Replace `{name}` placeholders with their example values.
///
/// Single pass over the template: substituted values are never rescanned,
/// so applying it again with the same inputs changes nothing. Placeholder
/// names match case-insensitively. Placeholders without an example are left
/// in place.
#[must_use]
pub fn substitute_path(template: &str, examples: &[(String, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match examples.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, value)) => out.push_str(value),
            None => {
                tracing::warn!(placeholder = name, path = template, "no example for path parameter");
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Name of the security scheme applied to an operation.
///
/// Only the first key of the first requirement counts. An operation without
/// `security` inherits the document-level list; an explicit empty list means
/// no security.
pub(super) fn security_name(doc: &Value, op: &Value) -> Option<String> {
    let requirements = op.get("security").or_else(|| doc.get("security"))?;
    requirements
        .as_array()?
        .first()?
        .as_object()?
        .keys()
        .next()
        .cloned()
}

/// Resolve a named schema out of a schema table.
///
/// `stack` holds the names currently being resolved; a reference back into
/// it is left unexpanded.
pub(super) fn build_schema(
    table: Option<&Value>,
    name: &str,
    stack: &mut Vec<String>,
) -> Result<Schema, SpecError> {
    let raw = table
        .and_then(|t| t.get(name))
        .ok_or_else(|| SpecError::SchemaNotFound(name.to_string()))?;

    let required: Vec<&str> = raw
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    stack.push(name.to_string());
    let mut properties = Vec::new();
    if let Some(props) = raw.get("properties").and_then(Value::as_object) {
        for (prop_name, prop) in props {
            let required = required.contains(&prop_name.as_str());
            match build_property(table, name, prop_name, prop, required, stack) {
                Ok(p) => properties.push(p),
                Err(e) => {
                    stack.pop();
                    return Err(e);
                }
            }
        }
    }
    stack.pop();

    Ok(Schema {
        name: name.to_string(),
        description: string_field(raw, "description"),
        properties,
        example: raw.get("example").cloned(),
    })
}

fn build_property(
    table: Option<&Value>,
    owner: &str,
    name: &str,
    prop: &Value,
    required: bool,
    stack: &mut Vec<String>,
) -> Result<Property, SpecError> {
    let (data_type, nested_ref) = if let Some(reference) = str_field(prop, "$ref") {
        (DataType::Object, Some(reference))
    } else {
        let declared = str_field(prop, "type").unwrap_or("(none)");
        let data_type = DataType::from_declared(declared).ok_or_else(|| SpecError::UnknownType {
            owner: format!("{owner}.{name}"),
            declared: declared.to_string(),
        })?;
        let items_ref = match data_type {
            DataType::Array => prop.get("items").and_then(|i| str_field(i, "$ref")),
            _ => None,
        };
        (data_type, items_ref)
    };

    let schema = match nested_ref {
        Some(reference) => {
            let nested = ref_name(reference)?;
            if stack.iter().any(|s| *s == nested) {
                None
            } else {
                Some(Box::new(build_schema(table, &nested, stack)?))
            }
        }
        None => None,
    };

    Ok(Property {
        name: name.to_string(),
        data_type,
        description: string_field(prop, "description"),
        required,
        schema,
    })
}

/// Header spec from a declared type string; a missing type reads as string.
pub(super) fn header_spec(
    name: &str,
    declared_type: Option<&str>,
    description: Option<String>,
    required: bool,
    example: Option<String>,
) -> Result<HeaderSpec, SpecError> {
    let declared = declared_type.unwrap_or("string");
    let data_type = DataType::from_declared(declared).ok_or_else(|| SpecError::UnknownType {
        owner: name.to_string(),
        declared: declared.to_string(),
    })?;
    Ok(HeaderSpec {
        name: name.to_string(),
        data_type,
        description,
        required,
        example,
    })
}

/// Shared validation of a raw security scheme once its type is known.
///
/// Basic schemes without an explicit location travel in `Authorization`.
pub(super) fn security_scheme(
    name: &str,
    raw: &Value,
    kind: SecurityType,
    example_keys: &[&str],
) -> Result<SecurityScheme, SpecError> {
    let example = first_example(raw, example_keys)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| SpecError::MissingSecurityExample(name.to_string()))?;

    let location = match (str_field(raw, "in"), kind) {
        (Some(declared), _) => ParamLocation::from_declared(declared).ok_or_else(|| {
            SpecError::UnknownParameterLocation {
                scheme: name.to_string(),
                location: declared.to_string(),
            }
        })?,
        (None, SecurityType::Basic) => ParamLocation::Header,
        (None, SecurityType::ApiKey) => {
            return Err(SpecError::UnknownParameterLocation {
                scheme: name.to_string(),
                location: "(none)".to_string(),
            });
        }
    };

    let param_name = match (str_field(raw, "name"), kind) {
        (Some(param), _) => param.to_string(),
        (None, SecurityType::Basic) => "Authorization".to_string(),
        (None, SecurityType::ApiKey) => {
            require_str(raw, "name", &format!("securitySchemes.{name}"))?.to_string()
        }
    };

    Ok(SecurityScheme {
        name: name.to_string(),
        kind,
        param_name,
        location,
        example,
    })
}

/// Reject request content types other than JSON.
pub(super) fn ensure_json_request(content_type: &str) -> Result<(), SpecError> {
    if content_type.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(SpecError::UnsupportedContentType(content_type.to_string()))
    }
}

/// Resolve the schema behind a body node against a schema table.
pub(super) fn body_schema(
    table: Option<&Value>,
    schema: Option<&Value>,
) -> Result<Option<Schema>, SpecError> {
    resolve_schema_ref(schema)?
        .map(|name| build_schema(table, &name, &mut Vec::new()))
        .transpose()
}

/// Response status codes; non-numeric keys such as `default` are skipped.
pub(super) fn status_code(key: &str) -> Option<u16> {
    key.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ex(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn container_type_inference() {
        assert_eq!(
            map_container_type(Some(&json!({"type": "array", "items": {"$ref": "#/definitions/W"}}))),
            DataType::Array
        );
        assert_eq!(
            map_container_type(Some(&json!({"$ref": "#/definitions/W"}))),
            DataType::Object
        );
        assert_eq!(map_container_type(Some(&json!({"type": "string"}))), DataType::String);
        assert_eq!(map_container_type(Some(&json!({"type": "object"}))), DataType::String);
        assert_eq!(map_container_type(None), DataType::String);
    }

    #[test]
    fn schema_ref_from_array_items_and_direct_ref() {
        let array = json!({"type": "array", "items": {"$ref": "#/components/schemas/Widget"}});
        assert_eq!(resolve_schema_ref(Some(&array)).unwrap().as_deref(), Some("Widget"));

        let object = json!({"$ref": "#/definitions/Gadget"});
        assert_eq!(resolve_schema_ref(Some(&object)).unwrap().as_deref(), Some("Gadget"));

        let inline = json!({"type": "array", "items": {"type": "string"}});
        assert_eq!(resolve_schema_ref(Some(&inline)).unwrap(), None);
    }

    #[test]
    fn ref_name_takes_final_word() {
        assert_eq!(ref_name("#/definitions/Widget_2").unwrap(), "Widget_2");
        assert_eq!(ref_name("Widget").unwrap(), "Widget");
        assert_eq!(
            ref_name("#/definitions/"),
            Err(SpecError::RefResolution("#/definitions/".into()))
        );
    }

    #[test]
    fn substitute_replaces_known_placeholders() {
        let out = substitute_path("/widgets/{id}/parts/{part}", &ex(&[("id", "42"), ("part", "a")]));
        assert_eq!(out, "/widgets/42/parts/a");
    }

    #[test]
    fn substitute_is_case_insensitive_and_keeps_unknown() {
        let out = substitute_path("/w/{ID}/{other}", &ex(&[("id", "7")]));
        assert_eq!(out, "/w/7/{other}");
    }

    #[test]
    fn substitute_does_not_rescan_values() {
        let examples = ex(&[("id", "{id}")]);
        let once = substitute_path("/w/{id}", &examples);
        assert_eq!(once, "/w/{id}");
        let ex2 = ex(&[("id", "42")]);
        let first = substitute_path("/w/{id}", &ex2);
        assert_eq!(substitute_path(&first, &ex2), first);
    }

    #[test]
    fn substitute_tolerates_unclosed_brace() {
        assert_eq!(substitute_path("/w/{id", &ex(&[("id", "1")])), "/w/{id");
    }

    #[test]
    fn security_name_first_requirement_with_global_fallback() {
        let doc = json!({"security": [{"global": []}]});
        assert_eq!(
            security_name(&doc, &json!({"security": [{"a": []}, {"b": []}]})).as_deref(),
            Some("a")
        );
        assert_eq!(security_name(&doc, &json!({})).as_deref(), Some("global"));
        assert_eq!(security_name(&doc, &json!({"security": []})), None);
    }

    #[test]
    fn build_schema_derives_required_from_owner() {
        let table = json!({
            "Widget": {
                "required": ["id"],
                "properties": {
                    "id": {"type": "number"},
                    "name": {"type": "string", "description": "label"}
                },
                "example": {"id": 1, "name": "a"}
            }
        });
        let schema = build_schema(Some(&table), "Widget", &mut Vec::new()).unwrap();
        assert_eq!(schema.properties.len(), 2);
        assert!(schema.property("id").unwrap().required);
        assert!(!schema.property("name").unwrap().required);
        assert_eq!(schema.property("name").unwrap().description.as_deref(), Some("label"));
        assert_eq!(schema.example, Some(json!({"id": 1, "name": "a"})));
    }

    #[test]
    fn build_schema_unknown_type() {
        let table = json!({"W": {"properties": {"n": {"type": "integer"}}}});
        let err = build_schema(Some(&table), "W", &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            SpecError::UnknownType {
                owner: "W.n".into(),
                declared: "integer".into()
            }
        );
    }

    #[test]
    fn build_schema_not_found() {
        let table = json!({});
        assert_eq!(
            build_schema(Some(&table), "Missing", &mut Vec::new()).unwrap_err(),
            SpecError::SchemaNotFound("Missing".into())
        );
        assert_eq!(
            build_schema(None, "Missing", &mut Vec::new()).unwrap_err(),
            SpecError::SchemaNotFound("Missing".into())
        );
    }

    #[test]
    fn build_schema_nests_refs_and_stops_on_cycles() {
        let table = json!({
            "Node": {
                "properties": {
                    "child": {"$ref": "#/definitions/Node"},
                    "tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}}
                }
            },
            "Tag": {"required": ["label"], "properties": {"label": {"type": "string"}}}
        });
        let schema = build_schema(Some(&table), "Node", &mut Vec::new()).unwrap();

        let child = schema.property("child").unwrap();
        assert_eq!(child.data_type, DataType::Object);
        assert!(child.schema.is_none(), "self reference must not expand");

        let tags = schema.property("tags").unwrap();
        assert_eq!(tags.data_type, DataType::Array);
        let tag = tags.schema.as_deref().unwrap();
        assert_eq!(tag.name, "Tag");
        assert!(tag.property("label").unwrap().required);
    }

    #[test]
    fn security_scheme_checks_example_then_location() {
        let no_example = json!({"type": "apiKey", "in": "header", "name": "X-Key"});
        assert_eq!(
            security_scheme("key", &no_example, SecurityType::ApiKey, &["example"]).unwrap_err(),
            SpecError::MissingSecurityExample("key".into())
        );

        let bad_location = json!({"type": "apiKey", "in": "body", "name": "X-Key", "example": "s"});
        assert!(matches!(
            security_scheme("key", &bad_location, SecurityType::ApiKey, &["example"]),
            Err(SpecError::UnknownParameterLocation { .. })
        ));

        let basic = json!({"type": "basic", "example": "dXNlcjpwYXNz"});
        let scheme = security_scheme("auth", &basic, SecurityType::Basic, &["example"]).unwrap();
        assert_eq!(scheme.location, ParamLocation::Header);
        assert_eq!(scheme.param_name, "Authorization");
    }

    #[test]
    fn json_is_the_only_request_content_type() {
        assert!(ensure_json_request("application/json").is_ok());
        assert_eq!(
            ensure_json_request("application/xml"),
            Err(SpecError::UnsupportedContentType("application/xml".into()))
        );
    }
}
