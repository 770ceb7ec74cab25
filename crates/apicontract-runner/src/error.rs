//! Hard errors that abort a run

use apicontract_core::{DataType, ErrorKind, ParamLocation, SpecError};

use crate::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error("No resource was selected for testing")]
    NoResourceSelected,
    #[error("Couldn't find a '{0}' request")]
    NoMatchingRequest(String),
    #[error("The request schema \"{0}\" contains no suitable example to use")]
    NoExampleAvailable(String),
    #[error("Request header \"{0}\" has no example value to send")]
    MissingHeaderExample(String),
    #[error("Couldn't find a response with status of {status} and Content-Type of '{content_type}'")]
    NoMatchingResponse { status: u16, content_type: String },
    #[error("Unknown response data type '{data_type}' for Content-Type '{content_type}'")]
    UnknownResponseShape {
        content_type: String,
        data_type: DataType,
    },
    #[error("The security location '{location}' of \"{scheme}\" is not supported yet")]
    UnsupportedSecurityLocation {
        scheme: String,
        location: ParamLocation,
    },
    #[error("Cannot serialize the request body: {0}")]
    Body(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RunError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Spec(e) => e.kind(),
            Self::NoMatchingRequest(_) | Self::NoMatchingResponse { .. } => ErrorKind::NotFound,
            Self::UnknownResponseShape { .. } | Self::UnsupportedSecurityLocation { .. } => {
                ErrorKind::Unsupported
            }
            Self::NoResourceSelected
            | Self::NoExampleAvailable(_)
            | Self::MissingHeaderExample(_)
            | Self::Body(_) => ErrorKind::Configuration,
            Self::Transport(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            RunError::from(SpecError::HostNotFound("prod".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RunError::NoExampleAvailable("NewWidget".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            RunError::UnsupportedSecurityLocation {
                scheme: "key".into(),
                location: ParamLocation::Query
            }
            .kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            RunError::from(TransportError::Client("tls".into())).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn spec_errors_keep_their_message() {
        let err = RunError::from(SpecError::ResourceNotFound("Nope".into()));
        assert_eq!(err.to_string(), "Resource \"Nope\" not found");
    }
}
