use axum::extract::rejection::JsonRejection;
use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pinhole_core::StorageError;
use pinhole_redirector::RedirectorError;
use pinhole_shortener::ShortenerError;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors that abort the process before the server starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to set global logger")]
    SetGlobalLogger(#[from] tracing_log::log_tracer::SetLoggerError),
    #[error("failed to set global subscriber")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("sqlite url is required when storage backend is sqlite")]
    MissingSqliteUrl,
    #[error("storage initialization failed: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid generator configuration: {0}")]
    Generator(#[from] pinhole_generator::Error),
}

/// Errors surfaced by request handlers.
///
/// Responses carry a short plain-text message; internal details only reach
/// the logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] JsonRejection),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error(transparent)]
    Redirector(#[from] RedirectorError),
    #[error("URL not found")]
    NotFound,
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Logging policy:
        // - error!: unexpected conditions that might indicate bugs
        // - warn!: retryable failures (contention, storage outages, deadlines)
        // - no log: client mistakes
        let (status, message) = match self {
            AppError::InvalidJson(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            ),
            AppError::Shortener(e) => shortener_failure(e),
            AppError::NotFound | AppError::Redirector(RedirectorError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "URL not found".to_string())
            }
            AppError::Redirector(RedirectorError::Storage(e)) => storage_failure(&e),
            AppError::Redirector(RedirectorError::Timeout(deadline)) => {
                warn!(?deadline, "request deadline exceeded");
                timed_out()
            }
            AppError::InvalidHeader(e) => {
                error!(error = ?e, "failed to construct response header");
                internal()
            }
        };

        (status, message).into_response()
    }
}

fn shortener_failure(e: ShortenerError) -> (StatusCode, String) {
    if let ShortenerError::InvalidUrl(reason) = &e {
        return (StatusCode::BAD_REQUEST, format!("Invalid URL: {}", reason));
    }
    if !e.is_retryable() {
        error!(error = %e, "unexpected shorten failure");
        return internal();
    }

    warn!(error = %e, "shorten failed, retryable");
    match e {
        ShortenerError::Timeout(_) => timed_out(),
        ShortenerError::GenerationExhausted { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Unable to generate a unique short code, please try again later".to_string(),
        ),
        _ => unavailable(),
    }
}

fn storage_failure(e: &StorageError) -> (StatusCode, String) {
    if e.is_transient() {
        warn!(error = %e, "storage unavailable");
        unavailable()
    } else {
        error!(error = %e, "unexpected storage failure");
        internal()
    }
}

fn unavailable() -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Service temporarily unavailable, please try again later".to_string(),
    )
}

fn timed_out() -> (StatusCode, String) {
    (
        StatusCode::GATEWAY_TIMEOUT,
        "Request timed out, please try again".to_string(),
    )
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinhole_core::ShortCode;
    use std::time::Duration;

    fn status(error: AppError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            status(ShortenerError::InvalidUrl("URL cannot be empty".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(RedirectorError::NotFound(ShortCode::new_unchecked("doesnotexist")).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn retryable_failures_map_to_5xx() {
        assert_eq!(
            status(ShortenerError::GenerationExhausted { attempts: 5 }.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(ShortenerError::Storage(StorageError::Unavailable("down".into())).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(RedirectorError::Storage(StorageError::Timeout("slow".into())).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(RedirectorError::Timeout(Duration::from_secs(2)).into()),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn unexpected_storage_failure_is_internal() {
        assert_eq!(
            status(RedirectorError::Storage(StorageError::InvalidData("bad row".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn shortener_status_follows_retryability() {
        let errors = [
            ShortenerError::GenerationExhausted { attempts: 5 },
            ShortenerError::Timeout(Duration::from_secs(5)),
            ShortenerError::Storage(StorageError::Unavailable("down".into())),
            ShortenerError::Storage(StorageError::Timeout("slow".into())),
            ShortenerError::Storage(StorageError::InvalidData("bad row".into())),
        ];

        for e in errors {
            let retryable = e.is_retryable();
            let status = status(e.clone().into());
            assert!(status.is_server_error(), "{e}");
            assert_eq!(
                status != StatusCode::INTERNAL_SERVER_ERROR,
                retryable,
                "{e}"
            );
        }
    }
}
