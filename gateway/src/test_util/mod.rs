//! Fixtures shared by unit and integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use face_gateway_common::{
    AttentionResponse, AttentionStatus, HandPosition, HandRaisingResponse, RawBoundingBox,
    RecognitionResponse, RecognitionStatus,
};

use crate::analysis::{FaceAnalysis, FaceImage, FrameUpload, LocalizedFrame};
use crate::config::{Config, ServicesConfig};
use crate::error::{Error, Result};
use crate::registry::ServiceName;

/// Configuration with every service pointed at `base_url`.
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.services = ServicesConfig {
        recognition: base_url.to_string(),
        localization: base_url.to_string(),
        attention: base_url.to_string(),
        handraising: base_url.to_string(),
    };
    config.http.timeout_secs = 5;
    config
}

/// Smallest byte string that sniffs as a JPEG.
pub fn jpeg_bytes() -> Vec<u8> {
    vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0xFF,
        0xD9,
    ]
}

/// [`jpeg_bytes`] base64 encoded, as the localization service returns crops.
pub fn jpeg_crop() -> String {
    base64::engine::general_purpose::STANDARD.encode(jpeg_bytes())
}

/// In-memory [`FaceAnalysis`] with scripted answers and call accounting.
///
/// Healthy answers: recognition finds `person-1`, attention is focused
/// (0.87), the hand is raised (0.93).
#[derive(Default)]
pub struct ScriptedAnalysis {
    crops: Vec<String>,
    boxes: Vec<RawBoundingBox>,
    fail_localization: bool,
    fail_recognition: bool,
    fail_attention: bool,
    fail_hand_raising: bool,
    localize_calls: AtomicUsize,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    correlation_keys: Mutex<Vec<Option<String>>>,
}

impl ScriptedAnalysis {
    /// Every service answers; localization finds no faces.
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn with_faces(mut self, crops: Vec<String>, boxes: Vec<RawBoundingBox>) -> Self {
        self.crops = crops;
        self.boxes = boxes;
        self
    }

    pub fn fail_localization(mut self) -> Self {
        self.fail_localization = true;
        self
    }

    pub fn fail_recognition(mut self) -> Self {
        self.fail_recognition = true;
        self
    }

    pub fn fail_attention(mut self) -> Self {
        self.fail_attention = true;
        self
    }

    pub fn fail_hand_raising(mut self) -> Self {
        self.fail_hand_raising = true;
        self
    }

    /// Per-face backend calls made so far (recognition, attention, hand-raising).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn localize_calls(&self) -> usize {
        self.localize_calls.load(Ordering::SeqCst)
    }

    /// Highest number of recognition calls observed running at once, i.e. faces in flight.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// `face_id` / `student_id` values received, in call order.
    pub fn correlation_keys(&self) -> Vec<Option<String>> {
        self.correlation_keys
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }

    fn record_key(&self, key: Option<&str>) {
        if let Ok(mut keys) = self.correlation_keys.lock() {
            keys.push(key.map(str::to_string));
        }
    }

    /// Account for one call and give other tasks a chance to run alongside it.
    async fn call<T>(&self, service: ServiceName, fail: bool, answer: T) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        if fail {
            Err(Error::ServiceUnavailable {
                service,
                details: "scripted failure".to_string(),
            })
        } else {
            Ok(answer)
        }
    }
}

#[async_trait]
impl FaceAnalysis for ScriptedAnalysis {
    async fn localize(&self, _frame: &FrameUpload) -> Result<LocalizedFrame> {
        self.localize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_localization {
            return Err(Error::ServiceUnavailable {
                service: ServiceName::Localization,
                details: "scripted failure".to_string(),
            });
        }
        Ok(LocalizedFrame {
            crops: self.crops.clone(),
            boxes: self.boxes.clone(),
        })
    }

    async fn identify(&self, _face: &FaceImage) -> Result<RecognitionResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self
            .call(
                ServiceName::Recognition,
                self.fail_recognition,
                RecognitionResponse {
                    person_id: "person-1".to_string(),
                    status: RecognitionStatus::Found,
                },
            )
            .await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn detect_attention(
        &self,
        _face: &FaceImage,
        face_id: Option<&str>,
        _lecture_id: &str,
        _timestamp: &str,
    ) -> Result<AttentionResponse> {
        self.record_key(face_id);
        self.call(
            ServiceName::Attention,
            self.fail_attention,
            AttentionResponse {
                attention_status: AttentionStatus::Focused,
                confidence: 0.87,
            },
        )
        .await
    }

    async fn detect_hand_raising(
        &self,
        _face: &FaceImage,
        student_id: Option<&str>,
        _timestamp: &str,
    ) -> Result<HandRaisingResponse> {
        self.record_key(student_id);
        self.call(
            ServiceName::HandRaising,
            self.fail_hand_raising,
            HandRaisingResponse {
                is_hand_raised: true,
                confidence: 0.93,
                hand_position: Some(HandPosition {
                    x: 0.5,
                    y: 0.2,
                    z: None,
                }),
            },
        )
        .await
    }
}
