use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rate limited - gave up after {0} retries")]
    RateLimited(u32),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is not a valid country array: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse failure class recorded in the repository state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum FailureKind {
    Transport,
    Decode,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FetchError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        FetchError::Status {
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Decode(_) => FailureKind::Decode,
            FetchError::Network(_)
            | FetchError::Io { .. }
            | FetchError::RateLimited(_)
            | FetchError::Status { .. } => FailureKind::Transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_short_body() {
        let err = FetchError::from_status(reqwest::StatusCode::NOT_FOUND, "missing");
        match err {
            FetchError::Status { status, ref body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let body = "x".repeat(2000);
        let err = FetchError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        let message = err.to_string();
        assert!(message.contains("truncated, 2000 total bytes"));
        assert!(message.len() < 700);
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        // 'é' is two bytes, so byte 500 falls inside a character
        let body = format!("a{}", "é".repeat(400));
        let truncated = FetchError::truncate_body(&body);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_decode_error_kind() {
        let err: FetchError = serde_json::from_str::<Vec<u32>>("{").unwrap_err().into();
        assert_eq!(err.kind(), FailureKind::Decode);
    }
}
