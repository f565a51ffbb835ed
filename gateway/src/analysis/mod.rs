//! Face analysis service abstraction.
//!
//! This module defines the `FaceAnalysis` trait that hides the four
//! analysis backends (localization, recognition, attention, hand-raising)
//! behind one interface, so the pipeline never deals with HTTP directly.

mod client;

pub use client::{build_http_client, HttpFaceAnalysis};

use async_trait::async_trait;
use axum::body::Bytes;
use base64::Engine;
use face_gateway_common::{
    AttentionResponse, HandRaisingResponse, RawBoundingBox, RecognitionResponse,
};
use image::ImageFormat;

use crate::error::{Error, Result};

/// A frame as uploaded by the caller.
#[derive(Debug, Clone)]
pub struct FrameUpload {
    pub data: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl FrameUpload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            content_type: None,
        }
    }
}

/// Localization output: crops and boxes, one pair per detected face.
///
/// The two lists come from the localization service as-is and are not
/// guaranteed to line up; the orchestrator checks that.
#[derive(Debug, Clone, Default)]
pub struct LocalizedFrame {
    /// Base64 encoded face crops.
    pub crops: Vec<String>,
    pub boxes: Vec<RawBoundingBox>,
}

/// A decoded, format-checked face crop.
#[derive(Debug, Clone)]
pub struct FaceImage {
    data: Vec<u8>,
    format: ImageFormat,
}

impl FaceImage {
    /// Decode a base64 crop (optionally a `data:` URI) and sniff its image format.
    pub fn decode(encoded: &str) -> Result<Self> {
        let payload = match encoded.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => encoded,
        };

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidImage(format!("not valid base64: {}", e)))?;

        if data.is_empty() {
            return Err(Error::InvalidImage("empty image".to_string()));
        }

        let format = image::guess_format(&data)
            .map_err(|e| Error::InvalidImage(format!("unrecognized image format: {}", e)))?;

        Ok(Self { data, format })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// File name sent with the multipart upload, e.g. `face.jpg`.
    pub fn file_name(&self) -> String {
        let ext = self.format.extensions_str().first().copied().unwrap_or("bin");
        format!("face.{}", ext)
    }
}

/// Client for the face analysis services.
///
/// `face_id` / `student_id` are the person id recognition produced for the
/// same crop. They are a correlation key only: `None` means recognition did
/// not identify the face and the call goes out tagged as unknown.
#[async_trait]
pub trait FaceAnalysis: Send + Sync {
    /// Detect faces in a full frame.
    async fn localize(&self, frame: &FrameUpload) -> Result<LocalizedFrame>;

    /// Identify the person in a face crop.
    async fn identify(&self, face: &FaceImage) -> Result<RecognitionResponse>;

    /// Classify whether the person is paying attention.
    async fn detect_attention(
        &self,
        face: &FaceImage,
        face_id: Option<&str>,
        lecture_id: &str,
        timestamp: &str,
    ) -> Result<AttentionResponse>;

    /// Detect a raised hand.
    async fn detect_hand_raising(
        &self,
        face: &FaceImage,
        student_id: Option<&str>,
        timestamp: &str,
    ) -> Result<HandRaisingResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{jpeg_bytes, jpeg_crop};

    #[test]
    fn test_decode_jpeg_crop() {
        let face = FaceImage::decode(&jpeg_crop()).unwrap();
        assert_eq!(face.format(), ImageFormat::Jpeg);
        assert_eq!(face.mime_type(), "image/jpeg");
        assert_eq!(face.file_name(), "face.jpg");
        assert_eq!(face.data(), jpeg_bytes().as_slice());
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = format!("data:image/jpeg;base64,{}", jpeg_crop());
        assert!(FaceImage::decode(&uri).is_ok());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = FaceImage::decode("%%% not base64 %%%").unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_decode_rejects_non_image_bytes() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"hello world");
        let err = FaceImage::decode(&encoded).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(FaceImage::decode(""), Err(Error::InvalidImage(_))));
    }
}
