//! HTTP surface for Rusty Videos.
//!
//! The router exposes a small CRUD API over the video store:
//!
//! - `GET /videos` – List every record in insertion order.
//! - `GET /videos/:id` – Fetch one record.
//! - `POST /videos` – Validate `title`, `author` and `availableResolutions`, then create a record
//!   (`201`). Server-side fields (`id`, `createdAt`, `publicationDate`, `canBeDownloaded`,
//!   `minAgeRestriction`) are filled in by the store.
//! - `PUT /videos/:id` – Validate and overwrite all six mutable fields (`204`).
//! - `DELETE /videos/:id` – Remove one record (`204`).
//! - `DELETE /testing/all-data` – Empty the store for test fixtures. Always answers `204`, even
//!   when nothing was stored.
//!
//! Bodies must be JSON objects; anything else answers `400` with a single `body` entry.
//! Validation failures answer `400` with `{"errorsMessages": [{"message", "field"}, ...]}`.
//! Unknown or non-numeric ids answer `404`.

use crate::videos::{
    FieldError, StoreError, ValidationErrors, VideoId, VideoInput, VideoRecord, VideoRepository,
    validate_create, validate_update,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Build the HTTP router over the given store.
pub fn create_router<R>(store: Arc<R>) -> Router
where
    R: VideoRepository + 'static,
{
    Router::new()
        .route("/videos", get(list_videos::<R>).post(create_video::<R>))
        .route(
            "/videos/:id",
            get(get_video::<R>)
                .put(update_video::<R>)
                .delete(delete_video::<R>),
        )
        .route("/testing/all-data", delete(clear_videos::<R>))
        .with_state(store)
}

/// Return every stored video.
async fn list_videos<R>(State(store): State<Arc<R>>) -> Json<Vec<VideoRecord>>
where
    R: VideoRepository,
{
    Json(store.list().await)
}

/// Return a single video by id.
async fn get_video<R>(
    State(store): State<Arc<R>>,
    Path(raw_id): Path<String>,
) -> Result<Json<VideoRecord>, ApiError>
where
    R: VideoRepository,
{
    let id = parse_id(&raw_id)?;
    Ok(Json(store.get_by_id(id).await?))
}

/// Validate a create request and store the new video.
async fn create_video<R>(
    State(store): State<Arc<R>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<VideoRecord>), ApiError>
where
    R: VideoRepository,
{
    let Json(body) = payload?;
    let input = VideoInput::from(body);
    let video = validate_create(&input)?;
    let record = store.create(video).await;
    tracing::info!(id = record.id, title = %record.title, "Video created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Validate an update request and overwrite the stored video.
///
/// The id is resolved before the body is looked at, so an unknown id answers `404` even when
/// the payload is invalid.
async fn update_video<R>(
    State(store): State<Arc<R>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
    R: VideoRepository,
{
    let id = parse_id(&raw_id)?;
    store.get_by_id(id).await?;
    let Json(body) = payload?;
    let input = VideoInput::from(body);
    let update = validate_update(&input)?;
    store.update(id, update).await?;
    tracing::info!(id, "Video updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a single video.
async fn delete_video<R>(
    State(store): State<Arc<R>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    R: VideoRepository,
{
    let id = parse_id(&raw_id)?;
    let removed = store.delete(id).await?;
    tracing::info!(id = removed.id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Drop every stored video.
async fn clear_videos<R>(State(store): State<Arc<R>>) -> StatusCode
where
    R: VideoRepository,
{
    match store.clear().await {
        Ok(removed) => tracing::info!(removed, "All videos deleted"),
        Err(err) => tracing::debug!(error = %err, "Nothing to clear"),
    }
    StatusCode::NO_CONTENT
}

fn parse_id(raw: &str) -> Result<VideoId, ApiError> {
    raw.parse().map_err(|_| {
        tracing::debug!(id = raw, "Rejecting non-numeric video id");
        ApiError::NotFound
    })
}

enum ApiError {
    NotFound,
    Validation(ValidationErrors),
    MalformedBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "No Video").into_response(),
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::MalformedBody(message) => {
                let errors = ValidationErrors::from(vec![FieldError {
                    message,
                    field: "body".into(),
                }]);
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(inner: StoreError) -> Self {
        tracing::debug!(error = %inner, "Store lookup failed");
        Self::NotFound
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(inner: ValidationErrors) -> Self {
        tracing::debug!(fields = ?inner.fields(), "Rejecting invalid video payload");
        Self::Validation(inner)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(inner: JsonRejection) -> Self {
        Self::MalformedBody(inner.body_text())
    }
}
