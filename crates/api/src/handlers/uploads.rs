//! Handlers for the `/uploads` resource: the upload-and-publish flow.
//!
//! A session is created from a multipart video upload, exposes its
//! screenshot candidates, and is published in a background task whose
//! state/progress is polled via the status endpoint.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use clipvault_core::transcode::image_dimensions;
use clipvault_pipeline::session::{PublisherIdentity, SourceVideo, UploadSession};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum accepted video payload (256 MiB).
pub const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Metadata for one screenshot candidate.
#[derive(Debug, Serialize)]
pub struct CandidateInfo {
    pub index: usize,
    pub timestamp_secs: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UploadCreated {
    pub session_id: Uuid,
    /// Suggested title: the file name minus its extension.
    pub default_title: String,
    pub selected: usize,
    pub candidates: Vec<CandidateInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PublishRequest {
    /// Externally supplied user identifier.
    #[validate(length(min = 1, message = "uid must not be empty"))]
    pub uid: String,
    #[validate(length(min = 1, message = "display_name must not be empty"))]
    pub display_name: String,
    #[validate(length(min = 3, max = 255, message = "title must be 3-255 characters"))]
    pub title: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /uploads -- validate the video and capture screenshot candidates.
pub async fn create_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadCreated>>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("clip.mp4").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(format!("Failed to read upload: {err}")))?
            .to_vec();

        tracing::info!(file_name, bytes = data.len(), "Received upload");

        let session = UploadSession::begin(
            state.extractor.as_ref(),
            SourceVideo {
                file_name,
                content_type,
                data,
            },
        )
        .await?;

        let candidates = session
            .candidates()
            .iter()
            .enumerate()
            .map(|(index, shot)| {
                let dims = image_dimensions(&shot.data);
                CandidateInfo {
                    index,
                    timestamp_secs: shot.timestamp.as_secs_f64(),
                    width: dims.map(|(w, _)| w),
                    height: dims.map(|(_, h)| h),
                }
            })
            .collect();

        let default_title = session.default_title();
        let selected = session.selected();
        let session_id = state.sessions.insert(session);

        return Ok((
            StatusCode::CREATED,
            Json(DataResponse {
                data: UploadCreated {
                    session_id,
                    default_title,
                    selected,
                    candidates,
                },
            }),
        ));
    }

    Err(AppError::BadRequest(
        "Missing multipart field 'file'".to_string(),
    ))
}

/// GET /uploads/{id}/screenshots/{index} -- one candidate as PNG bytes.
pub async fn get_screenshot(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> AppResult<impl IntoResponse> {
    let png = state.sessions.candidate_png(id, index)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// POST /uploads/{id}/select -- choose a screenshot candidate.
pub async fn select_screenshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectRequest>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let selected = state.sessions.select(id, payload.index)?;
    Ok(Json(DataResponse {
        data: serde_json::json!({ "selected": selected }),
    }))
}

/// POST /uploads/{id}/publish -- start the dual-asset upload and catalog
/// create in a background task. Progress is polled via the status route.
pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<serde_json::Value>>)> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let session = state.sessions.begin_publish(id)?;

    let identity = PublisherIdentity {
        uid: payload.uid,
        display_name: payload.display_name,
    };
    let blob = state.blob.clone();
    let catalog = state.catalog.clone();
    let title = payload.title;

    // Outcome lands in the session status channel; the handle is not
    // awaited by any request.
    tokio::spawn(async move {
        if let Err(err) = session.publish(blob, catalog, identity, title).await {
            tracing::warn!(session = %id, error = %err, "Publish failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: serde_json::json!({ "session_id": id }),
        }),
    ))
}

/// GET /uploads/{id}/status -- state, combined progress, clip id/error.
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<clipvault_pipeline::session::SessionStatus>>> {
    let status = state.sessions.status(id)?;
    Ok(Json(DataResponse { data: status }))
}

/// DELETE /uploads/{id} -- discard the session, cancelling any in-flight
/// asset uploads.
pub async fn discard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.discard(id)?;
    Ok(StatusCode::NO_CONTENT)
}
