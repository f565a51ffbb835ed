//! Per-face result types.

use serde::{Deserialize, Serialize};

/// Person id used when recognition did not identify the face.
pub const UNKNOWN_PERSON_ID: &str = "unknown";

/// Axis-aligned face rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bounding box as reported by the localization service.
///
/// Both shapes are seen in practice; [`RawBoundingBox::normalize`] turns
/// either into the canonical [`BoundingBox`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBoundingBox {
    Corners {
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl RawBoundingBox {
    /// Convert to `{x, y, width, height}` with non-negative extents.
    pub fn normalize(&self) -> BoundingBox {
        match *self {
            RawBoundingBox::Corners {
                x_min,
                y_min,
                x_max,
                y_max,
            } => BoundingBox {
                x: x_min.min(x_max),
                y: y_min.min(y_max),
                width: (x_max - x_min).abs(),
                height: (y_max - y_min).abs(),
            },
            RawBoundingBox::Rect {
                x,
                y,
                width,
                height,
            } => BoundingBox {
                x: if width < 0.0 { x + width } else { x },
                y: if height < 0.0 { y + height } else { y },
                width: width.abs(),
                height: height.abs(),
            },
        }
    }
}

impl From<BoundingBox> for RawBoundingBox {
    fn from(b: BoundingBox) -> Self {
        RawBoundingBox::Rect {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }
}

/// Outcome of identity recognition for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionStatus {
    /// First time this person is seen; a new id was enrolled.
    New,
    /// Matched an already known person.
    Found,
    /// Recognition did not produce a result.
    #[default]
    Failed,
    /// The recognition service reported an internal error.
    Error,
}

/// Attention classification for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttentionStatus {
    Focused,
    Unfocused,
    #[default]
    Unknown,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

/// Hand-raising verdict. `hand_position` is only expected when the hand is raised.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandRaisingStatus {
    pub is_hand_raised: bool,
    pub confidence: f64,
    #[serde(default)]
    pub hand_position: Option<HandPosition>,
}

/// Fully enriched result for one detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub person_id: String,
    pub recognition_status: RecognitionStatus,
    pub attention_status: AttentionStatus,
    pub hand_raising_status: HandRaisingStatus,
    /// Attention confidence.
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

impl Face {
    /// A face with every analysis field at its "nothing known" default.
    pub fn unanalyzed(bounding_box: BoundingBox) -> Self {
        Self {
            person_id: UNKNOWN_PERSON_ID.to_string(),
            recognition_status: RecognitionStatus::Failed,
            attention_status: AttentionStatus::Unknown,
            hand_raising_status: HandRaisingStatus::default(),
            confidence: 0.0,
            bounding_box,
        }
    }
}
