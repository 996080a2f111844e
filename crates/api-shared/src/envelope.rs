//! Response envelope.
//!
//! Every store response is wrapped as `{ "status": "success", "data": ... }` or
//! `{ "status": "error", "message": ... }`. A response is only a success when `status` is
//! literally `"success"`; a missing status counts as a failure whatever the HTTP status was.

use sencare_core::PatientError;
use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Some(STATUS_SUCCESS.into()),
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some(STATUS_ERROR.into()),
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// The payload of a successful response, if it carried one.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::Rejected`] when the status is missing or not `"success"`.
    pub fn into_data(self) -> Result<Option<T>, PatientError> {
        if self.is_success() {
            return Ok(self.data);
        }
        Err(PatientError::Rejected {
            status: self.status.unwrap_or_else(|| "<missing>".into()),
            message: self
                .message
                .unwrap_or_else(|| "no message in response".into()),
        })
    }
}

impl Envelope<()> {
    /// Success without a payload, as returned by deletes.
    pub fn ok() -> Self {
        Self {
            status: Some(STATUS_SUCCESS.into()),
            data: None,
            message: None,
        }
    }
}
