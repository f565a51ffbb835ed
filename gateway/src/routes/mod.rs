//! HTTP routes.

pub mod docs;
pub mod frame;
pub mod health;
pub mod proxy;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Build the gateway router.
///
/// `/api/process-frame` is a single segment, so it never collides with the
/// `/api/:service/*path` proxy route.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(docs::router())
        .merge(frame::router())
        .merge(proxy::router())
}
