//! Request authorization from a resolved security scheme

use apicontract_core::{OverriddenField, ParamLocation, SecurityOverride, SecurityScheme};

use crate::error::RunError;
use crate::transport::HttpRequest;

/// Apply an override to the resolved scheme right before use.
///
/// Without a resolved scheme there is nothing to patch and the override is
/// ignored.
pub fn apply_override(
    scheme: Option<&mut SecurityScheme>,
    over: Option<&SecurityOverride>,
) -> Vec<OverriddenField> {
    match (scheme, over) {
        (Some(scheme), Some(over)) => {
            let changed = over.apply(scheme);
            for field in &changed {
                tracing::info!(field = %field.field, value = %field.value, "overriding");
            }
            changed
        }
        _ => Vec::new(),
    }
}

/// Decorate `request` with the scheme's example credential.
///
/// # Errors
///
/// Returns [`RunError::UnsupportedSecurityLocation`] for locations other
/// than header and cookie.
pub fn authorize(scheme: Option<&SecurityScheme>, request: &mut HttpRequest) -> Result<(), RunError> {
    let Some(scheme) = scheme else {
        return Ok(());
    };

    match scheme.location {
        ParamLocation::Header => request.set_header(&scheme.param_name, scheme.example.as_str()),
        ParamLocation::Cookie => request.set_header(
            "Cookie",
            format!("{}={}", scheme.param_name, scheme.example),
        ),
        ParamLocation::Query => {
            return Err(RunError::UnsupportedSecurityLocation {
                scheme: scheme.name.clone(),
                location: scheme.location,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicontract_core::{HttpMethod, SecurityType};

    fn api_key(location: ParamLocation) -> SecurityScheme {
        SecurityScheme {
            name: "key".into(),
            kind: SecurityType::ApiKey,
            param_name: "X-Api-Key".into(),
            location,
            example: "test-key".into(),
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "http://localhost/widgets")
    }

    #[test]
    fn header_location() {
        let mut req = request();
        authorize(Some(&api_key(ParamLocation::Header)), &mut req).unwrap();
        assert_eq!(req.header("X-Api-Key"), Some("test-key"));
    }

    #[test]
    fn cookie_location() {
        let mut req = request();
        authorize(Some(&api_key(ParamLocation::Cookie)), &mut req).unwrap();
        assert_eq!(req.header("Cookie"), Some("X-Api-Key=test-key"));
    }

    #[test]
    fn query_location_is_unsupported() {
        let mut req = request();
        let err = authorize(Some(&api_key(ParamLocation::Query)), &mut req).unwrap_err();
        assert!(matches!(
            err,
            RunError::UnsupportedSecurityLocation {
                location: ParamLocation::Query,
                ..
            }
        ));
        assert!(req.headers.is_empty());
    }

    #[test]
    fn no_scheme_is_a_no_op() {
        let mut req = request();
        authorize(None, &mut req).unwrap();
        assert!(req.headers.is_empty());
    }

    #[test]
    fn override_swaps_credential() {
        let mut scheme = api_key(ParamLocation::Header);
        let over = SecurityOverride {
            example: Some("real-key".into()),
            ..SecurityOverride::default()
        };
        let changed = apply_override(Some(&mut scheme), Some(&over));
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].field, "Security.example");

        let mut req = request();
        authorize(Some(&scheme), &mut req).unwrap();
        assert_eq!(req.header("X-Api-Key"), Some("real-key"));
    }

    #[test]
    fn override_without_scheme_is_ignored() {
        let over = SecurityOverride {
            example: Some("real-key".into()),
            ..SecurityOverride::default()
        };
        assert!(apply_override(None, Some(&over)).is_empty());
    }
}
