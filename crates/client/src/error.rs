use studio_core::error::CoreError;

use crate::envelope::{
    CODE_JOB_ALREADY_CANCELLED, CODE_JOB_ALREADY_COMPLETED, CODE_JOB_NOT_FOUND,
};

/// Errors from the backend API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend rejected the credentials. The client has already
    /// forgotten its token.
    #[error("Unauthorized: login missing or expired")]
    Unauthorized,

    /// The envelope carried a non-success `code`.
    #[error("Business error ({code}): {message}")]
    Business { code: i32, message: String },

    /// The body was not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request was rejected before it was sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

impl ApiError {
    /// Whether the error means the requested job does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 404,
            Self::Business { code, .. } => *code == CODE_JOB_NOT_FOUND,
            _ => false,
        }
    }

    /// Whether a cancel request was refused because the job had already
    /// completed or been canceled.
    pub fn is_already_finished(&self) -> bool {
        matches!(
            self,
            Self::Business { code, .. }
                if *code == CODE_JOB_ALREADY_COMPLETED || *code == CODE_JOB_ALREADY_CANCELLED
        )
    }
}
