//! Root redirect and endpoint description.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/docs", get(docs))
}

/// GET / - redirect to the API documentation.
async fn root(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.config.server.docs_path)
}

#[derive(Debug, Serialize)]
struct ApiDocs {
    title: &'static str,
    description: &'static str,
    version: &'static str,
    endpoints: Vec<EndpointDoc>,
    services: Vec<ServiceDoc>,
}

#[derive(Debug, Serialize)]
struct EndpointDoc {
    method: &'static str,
    path: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceDoc {
    name: &'static str,
    url: String,
}

const ENDPOINTS: [EndpointDoc; 4] = [
    EndpointDoc {
        method: "POST",
        path: "/api/process-frame",
        description: "Analyze a lecture frame. Multipart fields: image, lectureId, timestamp (ISO 8601).",
    },
    EndpointDoc {
        method: "GET",
        path: "/health",
        description: "Gateway liveness check.",
    },
    EndpointDoc {
        method: "GET",
        path: "/",
        description: "Redirects to this document.",
    },
    EndpointDoc {
        method: "ANY",
        path: "/api/{service}/{path}",
        description: "Forward the request unchanged to one of the analysis services.",
    },
];

/// GET /docs - describe the gateway API and where each service lives.
async fn docs(State(state): State<Arc<AppState>>) -> Json<ApiDocs> {
    Json(ApiDocs {
        title: "Face Analysis Gateway API",
        description: "API Gateway for Face Analysis Services including Recognition, \
                      Attention Detection, Hand Raising Detection and Face Localization",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS.into_iter().collect(),
        services: state
            .registry
            .entries()
            .map(|(name, url)| ServiceDoc {
                name: name.as_str(),
                url: url.to_string(),
            })
            .collect(),
    })
}
