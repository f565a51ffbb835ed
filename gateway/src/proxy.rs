//! Transparent reverse proxy to the analysis services.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::Client;

use crate::error::{Error, Result};
use crate::registry::ServiceRegistry;

/// An inbound request to relay.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
}

/// The upstream answer, relayed as-is.
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Forwards requests to a named service without interpreting them.
pub struct ReverseProxy {
    registry: Arc<ServiceRegistry>,
    http_client: Client,
}

impl ReverseProxy {
    pub fn new(registry: Arc<ServiceRegistry>, http_client: Client) -> Self {
        Self {
            registry,
            http_client,
        }
    }

    /// Forward `request` to `path` on `service`.
    ///
    /// Whatever the service answers, including error statuses, is returned
    /// unchanged. Only a failure to reach it at all becomes an error.
    pub async fn forward(
        &self,
        service: &str,
        path: &str,
        request: ProxyRequest,
    ) -> Result<ProxiedResponse> {
        let (service, base_url) = self.registry.resolve(service)?;
        let url = target_url(base_url, path, request.query.as_deref());

        let is_head = request.method == Method::HEAD;
        let mut headers = request.headers;
        strip_hop_headers(&mut headers);
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::HOST);

        tracing::debug!("Proxying {} {} ({})", request.method, url, service);

        let upstream = self
            .http_client
            .request(request.method, &url)
            .headers(headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Service Error ({}): {}", service, e);
                Error::ServiceUnavailable {
                    service,
                    details: e.to_string(),
                }
            })?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_headers(&mut headers);
        // A HEAD reply has no body to recompute the length from.
        if !is_head {
            headers.remove(header::CONTENT_LENGTH);
        }
        let body = upstream.bytes().await.map_err(|e| {
            tracing::error!("Service Error ({}) while reading body: {}", service, e);
            Error::ServiceUnavailable {
                service,
                details: e.to_string(),
            }
        })?;

        Ok(ProxiedResponse {
            status,
            headers,
            body,
        })
    }
}

/// Framing headers belong to one connection.
fn strip_hop_headers(headers: &mut HeaderMap) {
    headers.remove(header::CONNECTION);
    headers.remove(header::TRANSFER_ENCODING);
}

/// `{base}/{path}{?query}`.
fn target_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", base_url, path.trim_start_matches('/'));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}
