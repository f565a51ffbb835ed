//! Frame-level aggregate types.

use serde::{Deserialize, Serialize};

use crate::face::{AttentionStatus, Face, RecognitionStatus};

/// Counts derived from the faces of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub new_faces: usize,
    pub known_faces: usize,
    pub focused_faces: usize,
    pub unfocused_faces: usize,
    pub hands_raised: usize,
}

impl Summary {
    pub fn from_faces(faces: &[Face]) -> Self {
        faces.iter().fold(Summary::default(), |mut summary, face| {
            match face.recognition_status {
                RecognitionStatus::New => summary.new_faces += 1,
                RecognitionStatus::Found => summary.known_faces += 1,
                RecognitionStatus::Failed | RecognitionStatus::Error => {}
            }
            match face.attention_status {
                AttentionStatus::Focused => summary.focused_faces += 1,
                AttentionStatus::Unfocused => summary.unfocused_faces += 1,
                AttentionStatus::Unknown | AttentionStatus::Error => {}
            }
            if face.hand_raising_status.is_hand_raised {
                summary.hands_raised += 1;
            }
            summary
        })
    }
}

/// Response for one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub lecture_id: String,
    /// Echoed exactly as the caller sent it.
    pub timestamp: String,
    pub total_faces: usize,
    pub faces: Vec<Face>,
    pub summary: Summary,
}

impl FrameResult {
    /// Build the result; `total_faces` and `summary` always describe `faces`.
    pub fn new(lecture_id: String, timestamp: String, faces: Vec<Face>) -> Self {
        Self {
            lecture_id,
            timestamp,
            total_faces: faces.len(),
            summary: Summary::from_faces(&faces),
            faces,
        }
    }
}
