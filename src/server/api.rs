//! # HTTP API
//!
//! Thin axum front end over [`StegoPipeline`]. It parses multipart uploads,
//! then on a blocking thread spools the image into the work directory and
//! hands the file to the pipeline. [`StegoError`] categories map onto HTTP
//! status codes.
//!
//! ## Endpoints
//!
//! - `POST /encode`: fields `image`, `message`, `secretKey` → `image/png` attachment
//! - `POST /decode`: fields `image`, `secretKey` → `{"message": "..."}`
//! - `GET /api/health`
//!
//! ## Status mapping
//!
//! | Category | Status |
//! |----------|--------|
//! | input validation, capacity, malformed artifact | 400 |
//! | authentication | 401 (`"Invalid secret key"`) |
//! | internal | 500 (generic message) |

use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::{ErrorCategory, StegoError};
use crate::pipeline::artifacts::write_synced;
use crate::pipeline::{RequestArtifacts, StegoPipeline};

#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared state for all handlers. The pipeline itself is stateless.
pub struct AppState {
    pub pipeline: StegoPipeline,
}

/// Build the application router.
pub fn router(pipeline: StegoPipeline, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { pipeline });

    Router::new()
        .route("/encode", post(encode_handler))
        .route("/decode", post(decode_handler))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "steganography-api",
    }))
}

/// Map a pipeline error to an HTTP status and a caller-safe body.
pub fn error_response(err: &StegoError) -> ApiError {
    let status = match err.category() {
        ErrorCategory::InputValidation
        | ErrorCategory::Capacity
        | ErrorCategory::MalformedArtifact => StatusCode::BAD_REQUEST,
        ErrorCategory::Authentication => StatusCode::UNAUTHORIZED,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.public_message(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Fields collected from a multipart form.
#[derive(Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    message: Option<String>,
    secret_key: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read image data: {}", e)))?;
                form.image = Some(data.to_vec());
            }
            "message" | "secretKey" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read field {}: {}", name, e)))?;
                if name == "message" {
                    form.message = Some(text);
                } else {
                    form.secret_key = Some(text);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Write an upload into the work directory under a request-unique name.
///
/// The path is owned by a cleanup guard before the first byte is written and
/// is only released once the write succeeded; the caller must hand it to a
/// pipeline operation that takes over its removal.
fn spool_upload(work_dir: &Path, data: &[u8]) -> Result<PathBuf, StegoError> {
    let mut artifacts = RequestArtifacts::new(Uuid::new_v4());
    let path = work_dir.join(format!("upload_{}.png", artifacts.request_id()));
    artifacts.track(&path);

    fs::create_dir_all(work_dir)
        .and_then(|()| write_synced(&path, data))
        .map_err(|e| {
            error!("❌ Failed to store upload {}: {}", path.display(), e);
            StegoError::Io(e)
        })?;

    artifacts.release(&path);
    Ok(path)
}

// Spooling and the pipeline call run in one blocking job, so a dropped
// request cannot strand an upload between the two.

fn encode_job(
    pipeline: &StegoPipeline,
    image: &[u8],
    message: &str,
    secret_key: &str,
) -> Result<Vec<u8>, StegoError> {
    let upload = spool_upload(&pipeline.config().work_dir, image)?;
    pipeline.encode_upload(&upload, message, secret_key)
}

fn decode_job(pipeline: &StegoPipeline, image: &[u8], secret_key: &str) -> Result<String, StegoError> {
    let upload = spool_upload(&pipeline.config().work_dir, image)?;
    pipeline.decode_upload(&upload, secret_key)
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    error!("❌ Pipeline task panicked: {}", e);
    error_response(&StegoError::InternalVerification(e.to_string()))
}

async fn encode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let (image, message, secret_key) = match (form.image, form.message, form.secret_key) {
        (Some(image), Some(message), Some(secret_key)) if !message.is_empty() && !secret_key.is_empty() => {
            (image, message, secret_key)
        }
        _ => return Err(bad_request("Image, message, and secret key are required")),
    };

    info!("📤 Received encode request ({} bytes)", image.len());

    let pipeline = state.pipeline.clone();

    // KDF and pixel passes are CPU-bound; keep them off the async runtime
    let encoded = tokio::task::spawn_blocking(move || {
        encode_job(&pipeline, &image, &message, &secret_key)
    })
    .await
    .map_err(join_error)?
    .map_err(|e| error_response(&e))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"encoded_image.png\"",
            ),
        ],
        encoded,
    ))
}

async fn decode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<DecodeResponse>, ApiError> {
    let form = read_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| bad_request("No image file uploaded"))?;
    let secret_key = form
        .secret_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| bad_request("Secret key is required"))?;

    info!("📥 Received decode request ({} bytes)", image.len());

    let pipeline = state.pipeline.clone();

    let message = tokio::task::spawn_blocking(move || decode_job(&pipeline, &image, &secret_key))
        .await
        .map_err(join_error)?
        .map_err(|e| error_response(&e))?;

    Ok(Json(DecodeResponse { message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamField;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StegoError::UnsupportedFormat, StatusCode::BAD_REQUEST),
            (StegoError::EmptyMessage, StatusCode::BAD_REQUEST),
            (
                StegoError::CapacityExceeded {
                    required_bits: 100,
                    capacity_bits: 50,
                },
                StatusCode::BAD_REQUEST,
            ),
            (StegoError::MissingParameter(ParamField::Salt), StatusCode::BAD_REQUEST),
            (StegoError::Authentication, StatusCode::UNAUTHORIZED),
            (
                StegoError::InternalVerification("mismatch".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let (status, _) = error_response(&err);
            assert_eq!(status, expected, "{err:?}");
        }
    }

    #[test]
    fn test_auth_failure_body() {
        let (_, Json(body)) = error_response(&StegoError::Authentication);
        assert_eq!(body.error, "Invalid secret key");
    }

    #[test]
    fn test_internal_body_is_generic() {
        let (_, Json(body)) =
            error_response(&StegoError::InternalVerification("parameter mismatch".into()));
        assert!(!body.error.contains("parameter"));
    }

    fn cover_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(32, 32, image::Rgb([90, 160, 30]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn work_dir_entries(dir: &Path) -> usize {
        fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    #[test]
    fn test_spool_upload_uses_unique_names() {
        let dir = tempfile::tempdir().unwrap();

        let a = spool_upload(dir.path(), b"first").unwrap();
        let b = spool_upload(dir.path(), b"second").unwrap();

        assert_ne!(a, b);
        assert_eq!(fs::read(&a).unwrap(), b"first");
        assert_eq!(fs::read(&b).unwrap(), b"second");
    }

    #[test]
    fn test_failed_spool_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the work directory should be
        let blocked = dir.path().join("uploads");
        fs::write(&blocked, b"not a directory").unwrap();

        let err = spool_upload(&blocked, b"data").unwrap_err();
        assert!(matches!(err, StegoError::Io(_)));
        assert_eq!(work_dir_entries(dir.path()), 1);
    }

    #[test]
    fn test_jobs_remove_their_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = StegoPipeline::new(crate::PipelineConfig::with_work_dir(dir.path()));

        let stego = encode_job(&pipeline, &cover_png(), "meet at noon", "correct horse").unwrap();
        assert_eq!(work_dir_entries(dir.path()), 0);

        assert_eq!(
            decode_job(&pipeline, &stego, "correct horse").unwrap(),
            "meet at noon"
        );
        assert_eq!(work_dir_entries(dir.path()), 0);

        let err = decode_job(&pipeline, &stego, "wrong horse").unwrap_err();
        assert!(matches!(err, StegoError::Authentication));
        assert_eq!(work_dir_entries(dir.path()), 0);

        let err = encode_job(&pipeline, b"not a png", "meet at noon", "correct horse").unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedFormat));
        assert_eq!(work_dir_entries(dir.path()), 0);
    }
}
