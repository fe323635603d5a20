use axum::http::StatusCode;
use tracing::error;

/// Failures reported by the scaling and lifecycle engines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("division by zero: {0}")]
    DivisionByZero(String),
}

impl EngineError {
    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::DivisionByZero(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Maps an engine failure onto the handler rejection shape.
pub fn rejection(e: EngineError) -> (StatusCode, String) {
    (e.status(), e.to_string())
}

/// Logs a repository failure and hides its details from the client.
pub fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "repository call failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_distinct_statuses() {
        assert_eq!(
            rejection(EngineError::InvalidArgument("x".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            rejection(EngineError::NotFound("x".into())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            rejection(EngineError::DivisionByZero("x".into())).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn internal_does_not_leak_details() {
        let (status, body) = internal(anyhow::anyhow!("connection refused at 10.0.0.3"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("10.0.0.3"));
    }
}
