//! Frame processing endpoint.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use face_gateway_common::FrameResult;

use crate::analysis::FrameUpload;
use crate::error::{Error, Result};
use crate::pipeline::validate_frame_input;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/process-frame", post(process_frame))
}

fn multipart_error(e: impl std::fmt::Display) -> Error {
    Error::InvalidInput(format!("Invalid multipart body: {}", e))
}

async fn field_text(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(multipart_error)
}

/// POST /api/process-frame - detect and analyze every face in a frame.
async fn process_frame(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<FrameResult>> {
    let mut multipart = multipart.map_err(|e| multipart_error(e.body_text()))?;

    let mut image = None;
    let mut lecture_id = String::new();
    let mut timestamp = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                image = Some(FrameUpload {
                    data,
                    file_name,
                    content_type,
                });
            }
            Some("lectureId") => lecture_id = field_text(field).await?,
            Some("timestamp") => timestamp = field_text(field).await?,
            _ => {}
        }
    }

    validate_frame_input(&lecture_id, &timestamp)?;
    let image = image.ok_or_else(|| Error::InvalidInput("Image is required".to_string()))?;

    let result = state
        .orchestrator
        .process_frame(&image, &lecture_id, &timestamp)
        .await?;

    Ok(Json(result))
}
