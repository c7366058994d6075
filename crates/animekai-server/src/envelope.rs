//! JSON envelope shared by every API route

use animekai_core::AnimeKaiError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

#[derive(Debug, serde::Serialize)]
struct ApiSuccess<T> {
    success: bool,
    data: T,
}

#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    success: bool,
    error: String,
}

impl From<&AnimeKaiError> for ApiError {
    fn from(error: &AnimeKaiError) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            success: false,
            error: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Wrap a scraper result: `200 {success, data}` or `500 {success, error}`.
pub fn respond<T>(result: Result<T, AnimeKaiError>) -> Response
where
    T: serde::Serialize,
{
    match result {
        Ok(data) => (
            StatusCode::OK,
            Json(ApiSuccess {
                success: true,
                data,
            }),
        )
            .into_response(),
        Err(error) => ApiError::from(&error).into_response(),
    }
}
