//! Configuration for the gateway.

use std::env;
use std::time::Duration;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use tokio::sync::Semaphore;

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for request bodies (frame uploads and proxied requests).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Where `GET /` redirects to.
    #[serde(default = "default_docs_path")]
    pub docs_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            docs_path: default_docs_path(),
        }
    }
}

/// Base URLs of the face analysis services.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_recognition_url")]
    pub recognition: String,
    #[serde(default = "default_localization_url")]
    pub localization: String,
    #[serde(default = "default_attention_url")]
    pub attention: String,
    #[serde(default = "default_handraising_url")]
    pub handraising: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            recognition: default_recognition_url(),
            localization: default_localization_url(),
            attention: default_attention_url(),
            handraising: default_handraising_url(),
        }
    }
}

/// Outbound HTTP settings shared by the analysis client and the proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Cap on concurrently enriched faces per frame. `None` runs every face at once.
    #[serde(default)]
    pub max_concurrent_faces: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated allowed origins, `*` for any.
    #[serde(default = "default_cors_origins")]
    pub origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_docs_path() -> String {
    "/docs".to_string()
}
fn default_recognition_url() -> String {
    "http://recognition:23121".to_string()
}
fn default_localization_url() -> String {
    "http://localization:23122".to_string()
}
fn default_attention_url() -> String {
    "http://attention:23123".to_string()
}
fn default_handraising_url() -> String {
    "http://handraising:23124".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_cors_origins() -> String {
    "*".to_string()
}

/// Flat variables from older deployments that seed the service table.
const LEGACY_SERVICE_VARS: [(&str, &str); 4] = [
    ("services.recognition", "RECOGNITION_URL"),
    ("services.localization", "LOCALIZATION_URL"),
    ("services.attention", "ATTENTION_URL"),
    ("services.handraising", "HANDRAISING_URL"),
];

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (GATEWAY__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Legacy service variables (RECOGNITION_URL, LOCALIZATION_URL, ...)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ServicesConfig::default();
        let mut builder = ConfigLoader::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("services.recognition", defaults.recognition)?
            .set_default("services.localization", defaults.localization)?
            .set_default("services.attention", defaults.attention)?
            .set_default("services.handraising", defaults.handraising)?
            .set_default("http.timeout_secs", default_timeout_secs() as i64)?;

        for (key, var) in LEGACY_SERVICE_VARS {
            if let Ok(url) = env::var(var) {
                builder = builder.set_default(key, url)?;
            }
        }

        let config: Config = builder
            // Load from config.toml if exists
            .add_source(File::with_name("config").required(false))
            // Override with environment variables (GATEWAY__SECTION__KEY format)
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the gateway cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(limit) = self.pipeline.max_concurrent_faces {
            if limit == 0 || limit > Semaphore::MAX_PERMITS {
                return Err(ConfigError::Message(format!(
                    "pipeline.max_concurrent_faces must be between 1 and {}",
                    Semaphore::MAX_PERMITS
                )));
            }
        }
        for (name, url) in [
            ("recognition", &self.services.recognition),
            ("localization", &self.services.localization),
            ("attention", &self.services.attention),
            ("handraising", &self.services.handraising),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "services.{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            services: ServicesConfig::default(),
            http: HttpConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8000);
        assert_eq!(server.docs_path, "/docs");
    }

    #[test]
    fn test_default_service_urls() {
        let services = ServicesConfig::default();
        assert_eq!(services.localization, "http://localization:23122");
        assert_eq!(services.handraising, "http://handraising:23124");
    }

    #[test]
    fn test_default_http_timeout_is_thirty_seconds() {
        assert_eq!(HttpConfig::default().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.pipeline.max_concurrent_faces = Some(0);
        assert!(config.validate().is_err());

        config.pipeline.max_concurrent_faces = Some(4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_concurrency_above_semaphore_capacity() {
        let mut config = Config::default();
        config.pipeline.max_concurrent_faces = Some(usize::MAX);
        assert!(config.validate().is_err());

        config.pipeline.max_concurrent_faces = Some(Semaphore::MAX_PERMITS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_service_url() {
        let mut config = Config::default();
        config.services.attention = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
