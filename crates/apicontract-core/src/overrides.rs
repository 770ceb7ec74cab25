//! Caller-supplied patches applied to resolved contract values right before
//! use, so a credential can be swapped without editing the document.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{ParamLocation, SecurityScheme, SecurityType};

/// Everything that can be overridden for one run.
///
/// ```toml
/// [override.security]
/// example = "my-real-api-key"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Override {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityOverride>,
}

impl Override {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.security.as_ref().is_none_or(SecurityOverride::is_empty)
    }
}

/// Per-field replacement for a [`SecurityScheme`]; unset fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SecurityOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SecurityType>,
    #[serde(default, alias = "paramName", skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(default, alias = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ParamLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// One field replaced by an override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OverriddenField {
    /// "Security.example"
    pub field: String,
    pub value: String,
}

impl SecurityOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.kind.is_none()
            && self.param_name.is_none()
            && self.location.is_none()
            && self.example.is_none()
    }

    /// Patch `scheme` in place and list what changed, in field order.
    pub fn apply(&self, scheme: &mut SecurityScheme) -> Vec<OverriddenField> {
        let mut changed = Vec::new();
        let mut note = |field: &str, value: String| {
            changed.push(OverriddenField {
                field: format!("Security.{field}"),
                value,
            });
        };

        if let Some(name) = &self.name {
            scheme.name.clone_from(name);
            note("name", name.clone());
        }
        if let Some(kind) = self.kind {
            scheme.kind = kind;
            note("type", kind.to_string());
        }
        if let Some(param_name) = &self.param_name {
            scheme.param_name.clone_from(param_name);
            note("paramName", param_name.clone());
        }
        if let Some(location) = self.location {
            scheme.location = location;
            note("in", location.to_string());
        }
        if let Some(example) = &self.example {
            scheme.example.clone_from(example);
            note("example", example.clone());
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> SecurityScheme {
        SecurityScheme {
            name: "key".into(),
            kind: SecurityType::ApiKey,
            param_name: "X-Key".into(),
            location: ParamLocation::Header,
            example: "from-doc".into(),
        }
    }

    #[test]
    fn apply_replaces_only_set_fields() {
        let over: SecurityOverride =
            serde_json::from_str(r#"{"example": "real", "in": "cookie"}"#).unwrap();
        let mut s = scheme();
        let changed = over.apply(&mut s);

        assert_eq!(s.example, "real");
        assert_eq!(s.location, ParamLocation::Cookie);
        assert_eq!(s.param_name, "X-Key");
        assert_eq!(
            changed,
            vec![
                OverriddenField {
                    field: "Security.in".into(),
                    value: "cookie".into()
                },
                OverriddenField {
                    field: "Security.example".into(),
                    value: "real".into()
                },
            ]
        );
    }

    #[test]
    fn type_override_is_recorded_by_document_name() {
        let over: SecurityOverride = serde_json::from_str(r#"{"type": "basic"}"#).unwrap();
        let mut s = scheme();
        let changed = over.apply(&mut s);

        assert_eq!(s.kind, SecurityType::Basic);
        assert_eq!(
            changed,
            vec![OverriddenField {
                field: "Security.type".into(),
                value: "basic".into()
            }]
        );
        assert_eq!(SecurityType::ApiKey.to_string(), "apiKey");
    }

    #[test]
    fn empty_override_changes_nothing() {
        let mut s = scheme();
        assert!(SecurityOverride::default().apply(&mut s).is_empty());
        assert_eq!(s, scheme());
        assert!(Override::default().is_empty());
    }

    #[test]
    fn parses_camel_case_payload() {
        let over: Override =
            serde_json::from_str(r#"{"security": {"paramName": "api_key", "type": "apiKey"}}"#)
                .unwrap();
        let sec = over.security.unwrap();
        assert_eq!(sec.param_name.as_deref(), Some("api_key"));
        assert_eq!(sec.kind, Some(SecurityType::ApiKey));
    }
}
