//! Frame orchestration: localize, fan out, aggregate.

use std::sync::Arc;

use face_gateway_common::FrameResult;
use futures_util::future::join_all;
use tokio::sync::Semaphore;

use super::{enrich_face, validate_frame_input, FrameContext};
use crate::analysis::{FaceAnalysis, FrameUpload};
use crate::error::{Error, Result};
use crate::registry::ServiceName;

/// Runs the whole frame pipeline against a [`FaceAnalysis`] backend.
#[derive(Clone)]
pub struct FrameOrchestrator {
    analysis: Arc<dyn FaceAnalysis>,
    /// Per-frame cap on concurrent enrichments; `None` means one per face.
    max_concurrent_faces: Option<usize>,
}

impl FrameOrchestrator {
    pub fn new(analysis: Arc<dyn FaceAnalysis>, max_concurrent_faces: Option<usize>) -> Self {
        Self {
            analysis,
            max_concurrent_faces,
        }
    }

    /// Process one frame.
    ///
    /// Input is validated before any backend is contacted. Faces whose crop
    /// cannot be decoded are dropped from the result; the returned counts only
    /// cover faces that made it through.
    ///
    /// Per-face work is joined in place rather than spawned, so dropping the
    /// returned future cancels every outstanding backend call.
    pub async fn process_frame(
        &self,
        frame: &FrameUpload,
        lecture_id: &str,
        timestamp: &str,
    ) -> Result<FrameResult> {
        validate_frame_input(lecture_id, timestamp)?;

        let localized = self.analysis.localize(frame).await.map_err(|e| {
            tracing::error!("Localization failed: {}", e);
            e.into_upstream(ServiceName::Localization)
        })?;

        if localized.crops.len() != localized.boxes.len() {
            tracing::error!(
                crops = localized.crops.len(),
                boxes = localized.boxes.len(),
                "Mismatch between number of faces and coordinates"
            );
            return Err(Error::Aggregation(format!(
                "Mismatch between detected faces ({}) and coordinates ({})",
                localized.crops.len(),
                localized.boxes.len()
            )));
        }

        let face_count = localized.crops.len();
        tracing::debug!(lecture_id, faces = face_count, "Localized faces");

        let ctx = FrameContext {
            lecture_id,
            timestamp,
        };
        let permits = self
            .max_concurrent_faces
            .unwrap_or(face_count)
            .clamp(1, Semaphore::MAX_PERMITS);
        let limit = Semaphore::new(permits);
        let analysis = self.analysis.as_ref();

        let tasks = localized
            .crops
            .iter()
            .zip(localized.boxes.iter())
            .map(|(crop, bounding_box)| {
                let limit = &limit;
                async move {
                    let _permit = limit
                        .acquire()
                        .await
                        .map_err(|e| Error::Internal(e.to_string()))?;
                    enrich_face(analysis, crop, bounding_box, ctx).await
                }
            });

        let mut faces = Vec::with_capacity(face_count);
        for (index, result) in join_all(tasks).await.into_iter().enumerate() {
            match result {
                Ok(face) => faces.push(face),
                Err(e) => tracing::warn!(face_index = index, "Face processing error: {}", e),
            }
        }

        tracing::info!(
            lecture_id,
            detected = face_count,
            processed = faces.len(),
            "Frame processed"
        );

        Ok(FrameResult::new(
            lecture_id.to_string(),
            timestamp.to_string(),
            faces,
        ))
    }
}
