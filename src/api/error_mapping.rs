//! Error mapping helpers for the StepSecurity transport and client.

use http::StatusCode;

use crate::error::ApiError;

/// Checks if a status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Only 200, 201 and 204 count as success; other 2xx codes are failures.
pub(super) const fn is_success_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT
    )
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let text = String::from_utf8_lossy(body).into_owned();
    if is_auth_failure(status) {
        ApiError::Authentication {
            status: status.as_u16(),
            body: text,
        }
    } else {
        ApiError::Status {
            status: status.as_u16(),
            body: text,
        }
    }
}

pub(super) fn map_reqwest_error(operation: &str, error: &reqwest::Error) -> ApiError {
    ApiError::Network {
        message: format!("{operation} failed: {error}"),
    }
}

pub(super) fn map_decode_error(operation: &str, error: &serde_json::Error) -> ApiError {
    ApiError::Decode {
        operation: operation.to_owned(),
        message: error.to_string(),
    }
}

pub(super) fn map_encode_error(operation: &str, error: &serde_json::Error) -> ApiError {
    ApiError::Encode {
        operation: operation.to_owned(),
        message: error.to_string(),
    }
}
