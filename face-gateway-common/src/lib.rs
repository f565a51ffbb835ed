//! Face Gateway Common Types
//!
//! Wire types shared by the gateway and anything that consumes its responses:
//! per-face results, frame aggregates and the analysis services' response contracts.

pub mod backend;
pub mod face;
pub mod frame;

pub use backend::{
    AttentionResponse, FaceCoordinates, HandRaisingResponse, LocalizedFaces, RecognitionResponse,
};
pub use face::{
    AttentionStatus, BoundingBox, Face, HandPosition, HandRaisingStatus, RawBoundingBox,
    RecognitionStatus, UNKNOWN_PERSON_ID,
};
pub use frame::{FrameResult, Summary};
