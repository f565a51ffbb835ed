//! Pass-through routes to the analysis services.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::routing::{on, MethodFilter};
use axum::Router;

use crate::error::Result;
use crate::proxy::{ProxiedResponse, ProxyRequest};
use crate::state::AppState;

const PROXIED_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::OPTIONS)
    .or(MethodFilter::HEAD)
    .or(MethodFilter::PATCH);

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/:service/*path", on(PROXIED_METHODS, proxy))
}

/// The part of the request path after `/api/{service}/`, still percent-encoded.
fn raw_tail(uri: &Uri) -> Option<&str> {
    uri.path()
        .strip_prefix("/api/")
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, tail)| tail)
}

/// ANY /api/{service}/{path} - forward to the named service.
async fn proxy(
    State(state): State<Arc<AppState>>,
    Path((service, path)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<ProxiedResponse> {
    let path = raw_tail(&uri).unwrap_or(&path);
    let request = ProxyRequest {
        method,
        headers,
        body,
        query,
    };
    state.proxy.forward(&service, path, request).await
}
