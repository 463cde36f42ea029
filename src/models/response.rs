use chrono::{DateTime, Utc};
use serde::Serialize;

/// Uniform envelope for every successful response.
#[derive(Serialize, Debug)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Error counterpart of [`SuccessResponse`]. `details` carries the underlying
/// cause for internal failures and is omitted otherwise.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
            timestamp: Utc::now(),
        }
    }
}
