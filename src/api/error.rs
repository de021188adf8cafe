use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";
pub const AUTH_REQUIRED: &str = "Authentication required. Please login again.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote content service answered with a non-2xx status.
    #[error("remote service responded with {status}: {}", message.as_deref().unwrap_or("no message"))]
    Remote {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("invalid api base url {0:?}")]
    InvalidBaseUrl(String),
    /// An authenticated operation was attempted without a session token.
    #[error("authentication required")]
    Unauthenticated,
}

impl ApiError {
    /// Text shown to the admin in the form banner.
    ///
    /// `fallback` is the operation specific message used when the remote
    /// service did not explain the failure itself.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Remote {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Remote { status, .. } if is_auth_status(*status) => AUTH_REQUIRED.to_owned(),
            ApiError::Remote { .. } => fallback.to_owned(),
            ApiError::Unauthenticated => AUTH_REQUIRED.to_owned(),
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::InvalidBaseUrl(_) => {
                UNEXPECTED_ERROR.to_owned()
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Remote { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    pub fn is_auth(&self) -> bool {
        match self {
            ApiError::Remote { status, .. } => is_auth_status(*status),
            ApiError::Unauthenticated => true,
            _ => false,
        }
    }
}

fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Error body of the remote service: `{ "message": .. }` or `{ "error": .. }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    pub(crate) fn into_message(self) -> Option<String> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        present(self.message).or_else(|| present(self.error))
    }
}
