use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinhole_core::ShortCode;
use tracing::{debug, info};

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;

    let shortened = state.shortener().shorten(&request.url).await?;
    let short_url = state.short_url(&shortened.code);

    info!(
        code = %shortened.code,
        reused = shortened.reused,
        "short url issued"
    );

    let body = CreateUrlResponse {
        key: shortened.code.to_string(),
        long_url: shortened.record.original_url,
        short_url,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    // a string that is not a well-formed code can never have been issued
    let code = ShortCode::new(code).map_err(|_| AppError::NotFound)?;

    let record = state.redirector().resolve(&code).await?;
    debug!(code = %code, "redirecting");

    let location = HeaderValue::from_bytes(record.original_url.as_bytes())?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
