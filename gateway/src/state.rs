//! Shared application state.

use std::sync::Arc;

use crate::analysis::{build_http_client, FaceAnalysis, HttpFaceAnalysis};
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::FrameOrchestrator;
use crate::proxy::ReverseProxy;
use crate::registry::ServiceRegistry;

/// Shared application state passed to all handlers.
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ServiceRegistry>,
    pub orchestrator: FrameOrchestrator,
    pub proxy: ReverseProxy,
}

impl AppState {
    /// Wire the HTTP analysis client and proxy against the configured services.
    pub fn new(config: Config) -> Result<Self> {
        let registry = Arc::new(ServiceRegistry::new(&config.services));
        let http_client = build_http_client(&config.http)?;
        let analysis = Arc::new(HttpFaceAnalysis::new(http_client.clone(), registry.clone()));

        Ok(Self::assemble(config, registry, analysis, http_client))
    }

    /// Same as [`AppState::new`] but with a caller-provided analysis backend.
    pub fn with_analysis(config: Config, analysis: Arc<dyn FaceAnalysis>) -> Result<Self> {
        let registry = Arc::new(ServiceRegistry::new(&config.services));
        let http_client = build_http_client(&config.http)?;

        Ok(Self::assemble(config, registry, analysis, http_client))
    }

    fn assemble(
        config: Config,
        registry: Arc<ServiceRegistry>,
        analysis: Arc<dyn FaceAnalysis>,
        http_client: reqwest::Client,
    ) -> Self {
        let orchestrator =
            FrameOrchestrator::new(analysis, config.pipeline.max_concurrent_faces);
        let proxy = ReverseProxy::new(registry.clone(), http_client);

        Self {
            config,
            registry,
            orchestrator,
            proxy,
        }
    }
}
