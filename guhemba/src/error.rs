use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while talking to the Guhemba gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Static credentials were never published to the environment. This is
    /// the one error that is surfaced to the framework boundary instead of
    /// being folded into a [`Payment`](crate::gateway::Payment).
    #[error("Guhemba configuration is not loaded: {0}")]
    ConfigurationMissing(#[source] envconfig::Error),

    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header value for {name}")]
    Header {
        name: &'static str,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    /// The request never produced an HTTP response (connection refused,
    /// DNS failure, timeout).
    #[error("HTTP error: {context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body as text: {context}: {source}")]
    BodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to deserialize JSON: {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The gateway answered with a non-success status. `message` comes from
    /// the remote JSON body (`message`, falling back to `error`), `hint`
    /// describes the failed exchange at the transport level.
    #[error("{message}")]
    Remote {
        status: StatusCode,
        message: String,
        hint: String,
    },

    /// Callback state handshake rejection.
    #[error("{message}")]
    Rejected {
        message: &'static str,
        hint: &'static str,
    },
}

impl GatewayError {
    /// Status code surfaced to the caller; 400 for everything that did not
    /// carry a remote HTTP status.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Remote { status, .. } => *status,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Fold the error into the uniform wire shape returned to callers.
    pub fn normalized(&self) -> NormalizedError {
        match self {
            GatewayError::Remote {
                status,
                message,
                hint,
            } => NormalizedError::with_hint(message.clone(), *status, hint.clone()),
            GatewayError::Rejected { message, hint } => NormalizedError::with_hint(
                (*message).to_string(),
                StatusCode::BAD_REQUEST,
                (*hint).to_string(),
            ),
            other => NormalizedError::new(other.to_string(), StatusCode::BAD_REQUEST),
        }
    }
}

/// Uniform error payload: `{ "success": false, "message": ..., "details"?: { "hint": ... } }`.
///
/// The status code rides along for the HTTP boundary but is not part of the
/// serialized body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedError {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
    #[serde(skip)]
    pub status: StatusCode,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetails {
    pub hint: String,
}

impl NormalizedError {
    pub fn new(message: String, status: StatusCode) -> Self {
        Self {
            success: false,
            message,
            details: None,
            status,
        }
    }

    pub fn with_hint(message: String, status: StatusCode, hint: String) -> Self {
        Self {
            success: false,
            message,
            details: Some(ErrorDetails { hint }),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_error_serializes_without_empty_details() {
        let err = NormalizedError::new("boom".into(), StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "boom" })
        );
    }

    #[test]
    fn normalized_error_serializes_hint_details() {
        let err = NormalizedError::with_hint(
            "Invalid merchant".into(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "HTTP status client error (422 Unprocessable Entity)".into(),
        );
        let json = serde_json::to_value(&err).unwrap();
        assert!(json["details"]["hint"].is_string());
        assert_eq!(json["success"], false);
        assert!(json.get("status").is_none());
    }

    #[test]
    fn remote_error_keeps_its_status() {
        let err = GatewayError::Remote {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "Invalid merchant".into(),
            hint: "POST transaction/exist".into(),
        };
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let normalized = err.normalized();
        assert_eq!(normalized.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(normalized.message, "Invalid merchant");
    }

    #[test]
    fn rejection_defaults_to_bad_request() {
        let err = GatewayError::Rejected {
            message: "Request state don't match",
            hint: "Please make sure you are not using the callback url twice",
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.normalized().details.is_some());
    }
}
