//! The error-mapping wrapper applied to every handler operation.

use crate::errors::{ApiError, HandlerError, Unhandled};
use axum::{
    extract::{Query, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use std::future::IntoFuture;

/// Unwrap query arguments taken as `Result<Query<T>, QueryRejection>`.
///
/// Handlers call this inside the wrapped operation so a malformed query
/// string is a validation failure rendered like any other.
pub fn query_args<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(args)| args)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

/// Run one handler operation and turn taxonomy failures into responses.
///
/// `op` may complete immediately (`std::future::ready(..)`) or suspend (an
/// `async` block); both settle through the same single conversion. Failures
/// outside the taxonomy come back as `Err(Unhandled)` for the host default.
pub async fn map_api_errors<T, F>(op: F) -> Result<Response, Unhandled>
where
    F: IntoFuture<Output = Result<T, HandlerError>>,
    T: IntoResponse,
{
    match op.await {
        Ok(value) => Ok(value.into_response()),
        Err(HandlerError::Api(err)) => Ok(err.into_response()),
        Err(HandlerError::Unhandled(err)) => Err(Unhandled(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use axum::{Json, body::to_bytes, http::StatusCode};
    use serde_json::{Value, json};
    use std::{
        future::ready,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn passes_success_through() {
        let response = map_api_errors(ready(Ok::<_, HandlerError>(Json(json!({ "ok": 1 })))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "ok": 1 }));
    }

    #[tokio::test]
    async fn converts_immediate_taxonomy_failure() {
        let op = ready(Err::<Json<Value>, _>(HandlerError::from(
            ApiError::validation("Filename is required"),
        )));
        let response = map_api_errors(op).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Filename is required" })
        );
    }

    #[tokio::test]
    async fn converts_after_suspension_settles() {
        let polls = Arc::new(AtomicUsize::new(0));
        let seen = polls.clone();
        let op = async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            seen.fetch_add(1, Ordering::SeqCst);
            Err::<Json<Value>, _>(HandlerError::from(ApiError::UpstreamTimeout(
                "Failed to connect to Onyx: Gateway timeout".into(),
            )))
        };

        let response = map_api_errors(op).await.unwrap();
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Failed to connect to Onyx: Gateway timeout" })
        );
    }

    #[test]
    fn malformed_query_is_a_validation_failure() {
        #[derive(Debug, serde::Deserialize)]
        struct Args {
            uri: Option<String>,
        }

        let uri: axum::http::Uri = "/s3?uri=a&uri=b".parse().unwrap();
        let err = query_args(Query::<Args>::try_from_uri(&uri)).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Validation);
        assert!(err.message().contains("uri"), "{}", err.message());

        let uri: axum::http::Uri = "/s3?uri=s3://bucket/key".parse().unwrap();
        let args = query_args(Query::<Args>::try_from_uri(&uri)).unwrap();
        assert_eq!(args.uri.as_deref(), Some("s3://bucket/key"));
    }

    #[tokio::test]
    async fn leaves_unclassified_failures_alone() {
        let op = async { Err::<Json<Value>, _>(HandlerError::from(std::io::Error::other("boom"))) };
        let Err(err) = map_api_errors(op).await else {
            panic!("io failure must not be converted");
        };
        assert_eq!(err.0.to_string(), "boom");
    }
}
