//! Response contracts of the face analysis services.
//!
//! These are the shapes the gateway expects back from its collaborators.
//! Anything that does not deserialize into them is treated as a malformed
//! response.

use serde::{Deserialize, Serialize};

use crate::face::{AttentionStatus, HandPosition, HandRaisingStatus, RawBoundingBox, RecognitionStatus};

/// `POST /identify` on the recognition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub person_id: String,
    pub status: RecognitionStatus,
}

/// `POST /detect-face-attention` on the attention service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionResponse {
    pub attention_status: AttentionStatus,
    pub confidence: f64,
}

/// `POST /detect-hand-raising` on the hand-raising service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandRaisingResponse {
    pub is_hand_raised: bool,
    pub confidence: f64,
    #[serde(default)]
    pub hand_position: Option<HandPosition>,
}

/// A position reported for a hand that is not raised is dropped.
impl From<HandRaisingResponse> for HandRaisingStatus {
    fn from(r: HandRaisingResponse) -> Self {
        Self {
            is_hand_raised: r.is_hand_raised,
            confidence: r.confidence,
            hand_position: r.hand_position.filter(|_| r.is_hand_raised),
        }
    }
}

/// `POST /localize-faces`: base64 encoded face crops in detection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedFaces {
    pub faces: Vec<String>,
}

/// `POST /localize-coords`: one box per face crop, same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceCoordinates {
    pub coordinates: Vec<RawBoundingBox>,
}
