use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use usrlinks_core::{EngineError, OutputError, TransportError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Transport(TransportError::InvalidProxy {
                address,
                reason,
            }) => {
                Self::bad_request(format!("invalid proxy {address}: {reason}"))
            }
            EngineError::Transport(other) => Self::internal(other.to_string()),
            EngineError::UnknownPlatforms(names) => Self::bad_request(format!(
                "unknown platforms: {}",
                names.join(", ")
            )),
            EngineError::Output(output) => output.into(),
        }
    }
}

impl From<OutputError> for AppError {
    fn from(err: OutputError) -> Self {
        Self::internal(format!("failed to produce scan output: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_proxy_is_a_client_error() {
        let err: AppError = EngineError::Transport(TransportError::InvalidProxy {
            address: "::".into(),
            reason: "missing host".into(),
        })
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn client_build_failure_is_internal() {
        let err: AppError =
            EngineError::Transport(TransportError::Client("tls".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_platform_selection_is_a_client_error() {
        let err: AppError =
            EngineError::UnknownPlatforms(vec!["Myspace".into()]).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "unknown platforms: Myspace");
    }
}
