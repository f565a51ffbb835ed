//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::registry::ServiceName;

/// Error types for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid face image: {0}")]
    InvalidImage(String),

    #[error("{service} service error: {message}")]
    Upstream {
        service: ServiceName,
        message: String,
    },

    #[error("{0}")]
    Aggregation(String),

    #[error("{service} service is currently unavailable")]
    ServiceUnavailable {
        service: ServiceName,
        details: String,
    },

    #[error("Service '{0}' not found")]
    ServiceNotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Report any failure talking to `service` as an upstream error.
    pub fn into_upstream(self, service: ServiceName) -> Self {
        match self {
            Error::Upstream { .. } => self,
            Error::ServiceUnavailable { details, .. } => Error::Upstream {
                service,
                message: details,
            },
            other => Error::Upstream {
                service,
                message: other.to_string(),
            },
        }
    }

    fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self {
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid Input"),
            Error::InvalidImage(_) => (StatusCode::BAD_REQUEST, "Invalid Image"),
            Error::Upstream { .. } => (StatusCode::BAD_GATEWAY, "Upstream Error"),
            Error::Aggregation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Pipeline Error"),
            Error::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
            }
            Error::ServiceNotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            Error::Config(_) | Error::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();
        let details = match &self {
            Error::ServiceUnavailable { details, .. } => Some(details.clone()),
            _ => None,
        };

        let body = Json(json!({
            "error": title,
            "message": self.to_string(),
            "details": details,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                Error::Upstream {
                    service: ServiceName::Localization,
                    message: "boom".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (Error::Aggregation("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::ServiceUnavailable {
                    service: ServiceName::Attention,
                    details: "refused".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (Error::ServiceNotFound("reco".into()), StatusCode::NOT_FOUND),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_into_upstream_keeps_transport_details() {
        let err = Error::ServiceUnavailable {
            service: ServiceName::Localization,
            details: "connection refused".into(),
        }
        .into_upstream(ServiceName::Localization);
        assert!(matches!(
            err,
            Error::Upstream { service: ServiceName::Localization, ref message } if message == "connection refused"
        ));
    }

    #[test]
    fn test_unavailable_message_names_service() {
        let err = Error::ServiceUnavailable {
            service: ServiceName::HandRaising,
            details: "timeout".into(),
        };
        assert_eq!(err.to_string(), "handraising service is currently unavailable");
    }
}
