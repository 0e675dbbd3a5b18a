//! Failure taxonomy shared by every handler.
//!
//! `ApiError` is the closed set of failures the UI knows how to display. Each
//! kind maps to one fixed HTTP status; the message is free text supplied where
//! the failure is detected. Anything outside the taxonomy travels as
//! [`HandlerError::Unhandled`] and is answered by the host fallback
//! ([`Unhandled`]), never formatted as a taxonomy error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Fieldless discriminant of [`ApiError`], used for the status lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Permission,
    NotFound,
    Internal,
    UpstreamUnavailable,
    UpstreamTimeout,
}

impl ErrorKind {
    #[cfg(test)]
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Validation,
        ErrorKind::Authentication,
        ErrorKind::Permission,
        ErrorKind::NotFound,
        ErrorKind::Internal,
        ErrorKind::UpstreamUnavailable,
        ErrorKind::UpstreamTimeout,
    ];

    /// The status code every error of this kind is answered with.
    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Permission => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

/// A classified failure, rendered as `{"message": ...}` with its kind's status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Input failed a validator rule or a required argument is missing.
    #[error("{0}")]
    Validation(String),

    /// A credential needed by the operation is not configured.
    #[error("{0}")]
    Authentication(String),

    /// Caller is not allowed in; only the access-token gate raises it.
    #[error("{0}")]
    Permission(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    #[allow(dead_code)]
    NotFound(String),

    /// A classified internal failure.
    #[error("{0}")]
    #[allow(dead_code)]
    Internal(String),

    /// The upstream actively refused the connection.
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// The upstream did not answer before the client deadline.
    #[error("{0}")]
    UpstreamTimeout(String),
}

impl ApiError {
    /// Shortcut for a 400 validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shortcut for a 401 missing-credentials failure.
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Authentication(_) => ErrorKind::Authentication,
            ApiError::Permission(_) => ErrorKind::Permission,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Internal(_) => ErrorKind::Internal,
            ApiError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            ApiError::UpstreamTimeout(_) => ErrorKind::UpstreamTimeout,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Authentication(msg)
            | ApiError::Permission(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg)
            | ApiError::UpstreamUnavailable(msg)
            | ApiError::UpstreamTimeout(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.message() }));
        (self.status_code(), body).into_response()
    }
}

/// Everything a handler operation can fail with.
#[derive(Debug)]
pub enum HandlerError {
    /// A taxonomy failure; converted by the error-mapping wrapper.
    Api(ApiError),
    /// Any other failure; propagates past the wrapper untouched.
    Unhandled(anyhow::Error),
}

impl From<ApiError> for HandlerError {
    fn from(err: ApiError) -> Self {
        HandlerError::Api(err)
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::Unhandled(err)
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::Unhandled(err.into())
    }
}

/// A failure the wrapper declined to classify.
///
/// Its response is the host's default: logged server-side, answered with a
/// bare 500 that carries no internal detail.
#[derive(Debug)]
pub struct Unhandled(pub anyhow::Error);

impl IntoResponse for Unhandled {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "unhandled failure while serving request");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "500: Internal Server Error",
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_codes_are_fixed_per_kind() {
        let codes: Vec<u16> = ErrorKind::ALL
            .iter()
            .map(|kind| kind.status_code().as_u16())
            .collect();
        assert_eq!(codes, vec![400, 401, 403, 404, 500, 502, 504]);
    }

    #[test]
    fn error_status_follows_kind_not_message() {
        let a = ApiError::validation("one");
        let b = ApiError::validation("something else entirely");
        assert_eq!(a.status_code(), b.status_code());
        assert_eq!(a.kind(), ErrorKind::Validation);
        assert_eq!(
            ApiError::UpstreamTimeout("slow".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::Permission("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = ApiError::authentication("Cannot connect");
        assert_eq!(err.to_string(), "Cannot connect");
        assert_eq!(err.message(), "Cannot connect");
    }

    #[tokio::test]
    async fn renders_message_body_with_kind_status() {
        let response = ApiError::UpstreamUnavailable("refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "message": "refused" }));
    }

    #[tokio::test]
    async fn unhandled_hides_internal_detail() {
        let response = Unhandled(anyhow::anyhow!("secret path /etc/x")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("secret"));
    }

    #[test]
    fn io_errors_are_not_classified() {
        let err: HandlerError = std::io::Error::other("disk full").into();
        assert!(matches!(err, HandlerError::Unhandled(_)));

        let err: HandlerError = ApiError::validation("bad").into();
        assert!(matches!(err, HandlerError::Api(ApiError::Validation(_))));
    }
}
