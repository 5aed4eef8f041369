//! The backend's uniform response wrapper.
//!
//! Every response body has the shape
//! `{"code": 200, "message": "...", "data": {...}, "timestamp": 1735900000000}`.
//! A `code` of 200 means success; anything else is a business error
//! whose `message` is meant for the user.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use studio_core::types::Timestamp;

use crate::error::ApiError;

/// Envelope code for a successful call.
pub const CODE_SUCCESS: i32 = 200;
/// Not logged in, or the session expired.
pub const CODE_UNAUTHORIZED: i32 = 40100;
/// The bearer token could not be verified.
pub const CODE_TOKEN_INVALID: i32 = 40101;
/// The bearer token is past its expiry.
pub const CODE_TOKEN_EXPIRED: i32 = 40102;
/// The job does not exist (or is not visible to the caller).
pub const CODE_JOB_NOT_FOUND: i32 = 40800;
/// The job already finished and can no longer be canceled.
pub const CODE_JOB_ALREADY_COMPLETED: i32 = 40801;
/// The job was already canceled.
pub const CODE_JOB_ALREADY_CANCELLED: i32 = 40802;

/// Decoded response body.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub message: Option<String>,
    pub data: Option<T>,
    /// Server time in milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Unwrap the payload, turning a non-success `code` into
    /// [`ApiError::Business`].
    ///
    /// A success envelope without `data` decodes `T` from JSON `null`,
    /// which works for `()` and `Option<_>` and fails for anything else.
    pub fn into_result(self) -> Result<T, ApiError> {
        if is_auth_failure(self.code) {
            return Err(ApiError::Unauthorized);
        }
        if self.code != CODE_SUCCESS {
            return Err(ApiError::Business {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }
        match self.data {
            Some(data) => Ok(data),
            None => Ok(T::deserialize(serde_json::Value::Null)?),
        }
    }
}

impl<T> Envelope<T> {
    /// Server time at which the response was produced.
    pub fn sent_at(&self) -> Option<Timestamp> {
        self.timestamp.and_then(chrono::DateTime::from_timestamp_millis)
    }
}

/// Whether an envelope code means the credentials were rejected.
pub fn is_auth_failure(code: i32) -> bool {
    matches!(code, CODE_UNAUTHORIZED | CODE_TOKEN_INVALID | CODE_TOKEN_EXPIRED)
}

/// Parse a raw body into an envelope.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>, ApiError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    let envelope = Envelope::<T>::deserialize(&mut de)?;
    de.end()?;
    Ok(envelope)
}
