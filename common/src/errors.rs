use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Structured error types for the weather service and its upstream calls
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Empty upstream response: {0}")]
    EmptyResponse(String),

    #[error("Failed to fetch weather for {0}")]
    WeatherUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError(message.into())
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::EmptyResponse(message.into())
    }

    pub fn weather_unavailable(city: impl Into<String>) -> Self {
        Self::WeatherUnavailable(city.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::HttpError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::NetworkError(_) => StatusCode::BAD_GATEWAY,
            AppError::ParseError(_) => StatusCode::BAD_GATEWAY,
            AppError::EmptyResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::WeatherUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_unavailable_is_a_server_error() {
        let err = AppError::weather_unavailable("Paris");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to fetch weather for Paris");
    }

    #[test]
    fn unknown_upstream_status_maps_to_bad_gateway() {
        assert_eq!(AppError::http(1000, "bogus").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::http(404, "missing").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = AppError::timeout("slow upstream");
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }
}
