//! Per-face enrichment.

use face_gateway_common::{Face, RawBoundingBox};

use super::FrameContext;
use crate::analysis::{FaceAnalysis, FaceImage};
use crate::error::Result;

/// Build the full result for one detected face.
///
/// Only an undecodable crop fails the face. Each backend call is isolated:
/// when one fails, its fields keep their defaults and the others still run.
pub async fn enrich_face(
    analysis: &dyn FaceAnalysis,
    crop: &str,
    bounding_box: &RawBoundingBox,
    ctx: FrameContext<'_>,
) -> Result<Face> {
    let image = FaceImage::decode(crop)?;
    let mut face = Face::unanalyzed(bounding_box.normalize());

    let person = match analysis.identify(&image).await {
        Ok(recognition) => Some(recognition),
        Err(e) => {
            tracing::warn!("Recognition failed, continuing as unknown: {}", e);
            None
        }
    };
    let person_id = person.as_ref().map(|r| r.person_id.as_str());

    let (attention, hand_raising) = tokio::join!(
        analysis.detect_attention(&image, person_id, ctx.lecture_id, ctx.timestamp),
        analysis.detect_hand_raising(&image, person_id, ctx.timestamp),
    );

    match attention {
        Ok(attention) => {
            face.attention_status = attention.attention_status;
            face.confidence = attention.confidence;
        }
        Err(e) => tracing::warn!(person_id = ?person_id, "Attention detection failed: {}", e),
    }

    match hand_raising {
        Ok(hand_raising) => face.hand_raising_status = hand_raising.into(),
        Err(e) => tracing::warn!(person_id = ?person_id, "Hand raising detection failed: {}", e),
    }

    if let Some(recognition) = person {
        face.person_id = recognition.person_id;
        face.recognition_status = recognition.status;
    }

    Ok(face)
}
