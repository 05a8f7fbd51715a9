use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clipvault_core::catalog::CatalogError;
use clipvault_core::error::CoreError;
use clipvault_pipeline::feed::FeedError;
use clipvault_pipeline::session::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error enums and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Pipeline(err) => classify_pipeline_error(err),

            AppError::Catalog(err) => match err {
                CatalogError::NotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Clip with id {id} not found"),
                ),
                CatalogError::Decode(msg) => {
                    tracing::error!(error = %msg, "Catalog decode error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                CatalogError::Store(msg) => {
                    tracing::error!(error = %msg, "Catalog store error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Feed(FeedError::PageFetchFailed(err)) => {
                tracing::error!(error = %err, "Feed page fetch failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "PAGE_FETCH_FAILED",
                    "Failed to load the next page".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map pipeline errors onto the HTTP taxonomy. Upload/publish failures
/// are normally observed through the session status endpoint; these
/// mappings cover the synchronous paths.
fn classify_pipeline_error(err: &PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::UnsupportedMedia(msg) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_MEDIA",
            msg.clone(),
        ),
        PipelineError::TranscodeFailed(source) => {
            tracing::error!(error = %source, "Screenshot capture failed");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "TRANSCODE_FAILED",
                "Could not capture screenshots from the video".to_string(),
            )
        }
        PipelineError::UploadFailed(source) => {
            tracing::error!(error = %source, "Asset upload failed");
            (
                StatusCode::BAD_GATEWAY,
                "UPLOAD_FAILED",
                "Upload failed! Please try again later.".to_string(),
            )
        }
        PipelineError::PublishFailed(msg) => {
            tracing::error!(error = %msg, "Catalog publish failed");
            (
                StatusCode::BAD_GATEWAY,
                "PUBLISH_FAILED",
                "Upload failed! Please try again later.".to_string(),
            )
        }
        PipelineError::InvalidSelection(index) => (
            StatusCode::BAD_REQUEST,
            "INVALID_SELECTION",
            format!("No screenshot candidate at index {index}"),
        ),
        PipelineError::InvalidTitle(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
    }
}
