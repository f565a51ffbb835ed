//! Face Analysis Gateway.
//!
//! Fronts the face localization, recognition, attention and hand-raising
//! services behind one frame-processing endpoint, plus a pass-through proxy.

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod proxy;
pub mod registry;
pub mod routes;
pub mod state;
pub mod test_util;

pub use analysis::{FaceAnalysis, FaceImage, FrameUpload, HttpFaceAnalysis, LocalizedFrame};
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::FrameOrchestrator;
pub use proxy::{ProxiedResponse, ProxyRequest, ReverseProxy};
pub use registry::{ServiceName, ServiceRegistry};
pub use state::AppState;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;

/// Build the CORS layer from a comma-separated origin list (`*` for any).
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the complete application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_bytes);

    routes::router()
        .layer(body_limit)
        .layer(middleware::from_fn(logging::request_logger))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
