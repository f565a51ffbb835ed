//! HTTP implementation of the face analysis client.

use std::sync::Arc;

use async_trait::async_trait;
use face_gateway_common::{
    AttentionResponse, FaceCoordinates, HandRaisingResponse, LocalizedFaces, RecognitionResponse,
    UNKNOWN_PERSON_ID,
};
use reqwest::multipart::{Form, Part};
use reqwest::{redirect, Client, StatusCode};
use serde::de::DeserializeOwned;

use super::{FaceAnalysis, FaceImage, FrameUpload, LocalizedFrame};
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::registry::{ServiceName, ServiceRegistry};

/// Build the outbound HTTP client shared by the analysis client and the proxy.
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .redirect(redirect::Policy::limited(config.max_redirects))
        .build()
        .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))
}

/// Talks to the analysis services over multipart HTTP.
pub struct HttpFaceAnalysis {
    http_client: Client,
    registry: Arc<ServiceRegistry>,
}

impl HttpFaceAnalysis {
    pub fn new(http_client: Client, registry: Arc<ServiceRegistry>) -> Self {
        Self {
            http_client,
            registry,
        }
    }

    /// POST a multipart form and decode the JSON reply.
    async fn post_form<T: DeserializeOwned>(
        &self,
        service: ServiceName,
        path: &str,
        form: Form,
    ) -> Result<T> {
        let url = self.registry.url(service, path);
        tracing::debug!("Sending request to {} service: {}", service, url);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::ServiceUnavailable {
                service,
                details: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::ServiceUnavailable {
                service,
                details: e.to_string(),
            })?;

        if status != StatusCode::OK {
            return Err(Error::Upstream {
                service,
                message: format!("HTTP {}: {}", status, String::from_utf8_lossy(&body)),
            });
        }

        serde_json::from_slice(&body).map_err(|e| Error::Upstream {
            service,
            message: format!("malformed response from {}: {}", path, e),
        })
    }
}

/// The frame as uploaded; an unparseable content type is dropped rather than forwarded.
fn frame_part(frame: &FrameUpload) -> Part {
    let part = || {
        Part::bytes(frame.data.to_vec())
            .file_name(frame.file_name.clone().unwrap_or_else(|| "frame.jpg".to_string()))
    };
    match frame.content_type.as_deref() {
        Some(mime) => part().mime_str(mime).unwrap_or_else(|e| {
            tracing::debug!("Ignoring content type {:?}: {}", mime, e);
            part()
        }),
        None => part(),
    }
}

fn face_part(face: &FaceImage) -> Result<Part> {
    Part::bytes(face.data().to_vec())
        .file_name(face.file_name())
        .mime_str(face.mime_type())
        .map_err(|e| Error::Internal(e.to_string()))
}

#[async_trait]
impl FaceAnalysis for HttpFaceAnalysis {
    async fn localize(&self, frame: &FrameUpload) -> Result<LocalizedFrame> {
        let coords_form = Form::new().part("image", frame_part(frame));
        let faces_form = Form::new().part("image", frame_part(frame));

        let (coords, faces) = tokio::try_join!(
            self.post_form::<FaceCoordinates>(ServiceName::Localization, "localize-coords", coords_form),
            self.post_form::<LocalizedFaces>(ServiceName::Localization, "localize-faces", faces_form),
        )?;

        Ok(LocalizedFrame {
            crops: faces.faces,
            boxes: coords.coordinates,
        })
    }

    async fn identify(&self, face: &FaceImage) -> Result<RecognitionResponse> {
        let form = Form::new().part("image", face_part(face)?);
        self.post_form(ServiceName::Recognition, "identify", form)
            .await
    }

    async fn detect_attention(
        &self,
        face: &FaceImage,
        face_id: Option<&str>,
        lecture_id: &str,
        timestamp: &str,
    ) -> Result<AttentionResponse> {
        let form = Form::new()
            .part("image", face_part(face)?)
            .text("face_id", face_id.unwrap_or(UNKNOWN_PERSON_ID).to_string())
            .text("lecture_id", lecture_id.to_string())
            .text("timestamp", timestamp.to_string());
        self.post_form(ServiceName::Attention, "detect-face-attention", form)
            .await
    }

    async fn detect_hand_raising(
        &self,
        face: &FaceImage,
        student_id: Option<&str>,
        timestamp: &str,
    ) -> Result<HandRaisingResponse> {
        let form = Form::new()
            .part("image", face_part(face)?)
            .text("student_id", student_id.unwrap_or(UNKNOWN_PERSON_ID).to_string())
            .text("timestamp", timestamp.to_string());
        self.post_form(ServiceName::HandRaising, "detect-hand-raising", form)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServicesConfig;
    use crate::test_util::jpeg_crop;
    use face_gateway_common::{AttentionStatus, RecognitionStatus};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    /// Byte-level body match; multipart bodies carry binary image data.
    fn body_contains(needle: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
        move |req: &Request| {
            req.body
                .windows(needle.len())
                .any(|window| window == needle.as_bytes())
        }
    }

    fn client_for(server: &MockServer) -> HttpFaceAnalysis {
        let uri = server.uri();
        let registry = ServiceRegistry::new(&ServicesConfig {
            recognition: uri.clone(),
            localization: uri.clone(),
            attention: uri.clone(),
            handraising: uri,
        });
        HttpFaceAnalysis::new(
            build_http_client(&HttpConfig::default()).unwrap(),
            Arc::new(registry),
        )
    }

    #[tokio::test]
    async fn test_identify_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identify"))
            .and(body_contains("name=\"image\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"person_id": "p-1", "status": "found"})),
            )
            .mount(&server)
            .await;

        let face = FaceImage::decode(&jpeg_crop()).unwrap();
        let result = client_for(&server).identify(&face).await.unwrap();
        assert_eq!(result.person_id, "p-1");
        assert_eq!(result.status, RecognitionStatus::Found);
    }

    #[tokio::test]
    async fn test_non_200_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identify"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&server)
            .await;

        let face = FaceImage::decode(&jpeg_crop()).unwrap();
        let err = client_for(&server).identify(&face).await.unwrap_err();
        match err {
            Error::Upstream { service, message } => {
                assert_eq!(service, ServiceName::Recognition);
                assert!(message.contains("model crashed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-face-attention"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"attention": "yes"})))
            .mount(&server)
            .await;

        let face = FaceImage::decode(&jpeg_crop()).unwrap();
        let err = client_for(&server)
            .detect_attention(&face, None, "lec", "2024-01-15T10:30:00Z")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { service: ServiceName::Attention, .. }));
    }

    #[tokio::test]
    async fn test_attention_sends_correlation_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-face-attention"))
            .and(body_contains("unknown"))
            .and(body_contains("lecture-42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"attention_status": "FOCUSED", "confidence": 0.8})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let face = FaceImage::decode(&jpeg_crop()).unwrap();
        let result = client_for(&server)
            .detect_attention(&face, None, "lecture-42", "2024-01-15T10:30:00Z")
            .await
            .unwrap();
        assert_eq!(result.attention_status, AttentionStatus::Focused);
    }

    #[tokio::test]
    async fn test_localize_combines_both_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/localize-coords"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "coordinates": [{"x_min": 10, "y_min": 20, "x_max": 50, "y_max": 80}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/localize-faces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "faces": [jpeg_crop()]
            })))
            .mount(&server)
            .await;

        let frame = FrameUpload::new(vec![0xFF, 0xD8, 0xFF]);
        let localized = client_for(&server).localize(&frame).await.unwrap();
        assert_eq!(localized.crops.len(), 1);
        assert_eq!(localized.boxes.len(), 1);
        assert_eq!(localized.boxes[0].normalize().height, 60.0);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let registry = ServiceRegistry::new(&ServicesConfig {
            recognition: "http://127.0.0.1:1".to_string(),
            ..ServicesConfig::default()
        });
        let client = HttpFaceAnalysis::new(
            build_http_client(&HttpConfig::default()).unwrap(),
            Arc::new(registry),
        );

        let face = FaceImage::decode(&jpeg_crop()).unwrap();
        let err = client.identify(&face).await.unwrap_err();
        assert!(matches!(
            err,
            Error::ServiceUnavailable { service: ServiceName::Recognition, .. }
        ));
    }
}
