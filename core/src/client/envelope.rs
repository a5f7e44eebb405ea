// Backend response envelope and client errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Client context has been disposed")]
    Disposed,
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Backend error: {0}")]
    Api(String),
    #[error("Backend returned success without data")]
    MissingData,
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `{ success, data, error }` as returned by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Unwrap the payload, turning `success: false` into `ClientError::Api`.
    pub fn into_result(self) -> Result<T, ClientError> {
        if !self.success {
            return Err(ClientError::Api(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        self.data.ok_or(ClientError::MissingData)
    }
}
