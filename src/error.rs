use thiserror::Error;

use crate::netlify::NetlifyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed environment variable id '{id}': expected key/account_id/site_id")]
    MalformedId { id: String },

    #[error(transparent)]
    Transport(#[from] NetlifyError),

    #[error("invalid attribute '{field}': {message}")]
    InvalidAttribute { field: String, message: String },

    #[error("environment variable '{id}' disappeared right after it was written")]
    Vanished { id: String },

    #[error("unresolved reference '{reference}'")]
    UnresolvedReference { reference: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// The transport error underneath, if this error came from the API.
    pub fn transport(&self) -> Option<&NetlifyError> {
        match self {
            Error::Transport(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_malformed_id_display() {
        let err = Error::MalformedId {
            id: "only-a-key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed environment variable id 'only-a-key': expected key/account_id/site_id"
        );
    }

    #[test]
    fn test_invalid_attribute_display() {
        let err = Error::invalid("context", "must be one of [all]");
        assert_eq!(
            err.to_string(),
            "invalid attribute 'context': must be one of [all]"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("missing token".to_string());
        assert_eq!(err.to_string(), "configuration error: missing token");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_transport_error_from_conversion_is_transparent() {
        let transport = NetlifyError::Api {
            status: 500,
            payload: None,
        };
        let err: Error = transport.into();
        assert!(err.transport().is_some());
        assert_eq!(err.to_string(), "API error (500): <empty response>");
    }

    #[test]
    fn test_transport_accessor_on_other_variants() {
        let err = Error::Vanished {
            id: "K/a/".to_string(),
        };
        assert!(err.transport().is_none());
    }
}
