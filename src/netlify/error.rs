use thiserror::Error;

use super::types::ApiErrorBody;

/// Netlify-specific errors that can occur during API operations.
///
/// SECURITY: Error messages must NEVER contain sensitive data like API tokens.
#[derive(Debug, Error)]
pub enum NetlifyError {
    /// Authentication setup failed (token cannot be sent as a header)
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The addressed object does not exist (HTTP 404)
    #[error("not found: {path}")]
    NotFound { path: String },

    /// API returned a non-success status other than 404.
    ///
    /// `payload` is `None` only when the response body was empty. A body that
    /// is not the `{code, message}` shape is carried as the message.
    #[error("API error ({status}): {}", describe_payload(.payload))]
    Api {
        status: u16,
        payload: Option<ApiErrorBody>,
    },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body did not match the expected shape
    #[error("failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl NetlifyError {
    /// Numeric HTTP status carried by the error, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            NetlifyError::NotFound { .. } => Some(404),
            NetlifyError::Api { status, .. } => Some(*status),
            NetlifyError::Network(err) => err.status().map(|s| s.as_u16()),
            NetlifyError::Auth { .. } | NetlifyError::Decode { .. } => None,
        }
    }

    /// True for an `Api` error that has a status but no error payload.
    pub fn is_empty_api_error(&self) -> bool {
        matches!(self, NetlifyError::Api { payload: None, .. })
    }
}

fn describe_payload(payload: &Option<ApiErrorBody>) -> String {
    match payload {
        Some(body) => body.message.clone(),
        None => "<empty response>".to_string(),
    }
}
