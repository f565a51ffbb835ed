//! Backend service registry.
//!
//! Maps the logical name of each face analysis service to its base URL.
//! Built once from configuration and shared read-only afterwards.

use std::fmt;
use std::str::FromStr;

use crate::config::ServicesConfig;
use crate::error::{Error, Result};

/// The face analysis services the gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Recognition,
    Localization,
    Attention,
    HandRaising,
}

impl ServiceName {
    pub const ALL: [ServiceName; 4] = [
        ServiceName::Recognition,
        ServiceName::Localization,
        ServiceName::Attention,
        ServiceName::HandRaising,
    ];

    /// Lowercase name, as used in proxy paths and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Recognition => "recognition",
            ServiceName::Localization => "localization",
            ServiceName::Attention => "attention",
            ServiceName::HandRaising => "handraising",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = Error;

    /// Case-insensitive lookup.
    fn from_str(s: &str) -> Result<Self> {
        ServiceName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::ServiceNotFound(s.to_string()))
    }
}

/// Immutable service name to base URL table.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    recognition: String,
    localization: String,
    attention: String,
    handraising: String,
}

impl ServiceRegistry {
    pub fn new(services: &ServicesConfig) -> Self {
        let trim = |url: &str| url.trim().trim_end_matches('/').to_string();
        Self {
            recognition: trim(&services.recognition),
            localization: trim(&services.localization),
            attention: trim(&services.attention),
            handraising: trim(&services.handraising),
        }
    }

    /// Base URL of a known service, without trailing slash.
    pub fn base_url(&self, service: ServiceName) -> &str {
        match service {
            ServiceName::Recognition => &self.recognition,
            ServiceName::Localization => &self.localization,
            ServiceName::Attention => &self.attention,
            ServiceName::HandRaising => &self.handraising,
        }
    }

    /// Resolve a service by name, ignoring case.
    pub fn resolve(&self, name: &str) -> Result<(ServiceName, &str)> {
        let service = name.parse::<ServiceName>()?;
        Ok((service, self.base_url(service)))
    }

    /// Absolute URL of `path` on `service`.
    pub fn url(&self, service: ServiceName, path: &str) -> String {
        format!("{}/{}", self.base_url(service), path.trim_start_matches('/'))
    }

    pub fn entries(&self) -> impl Iterator<Item = (ServiceName, &str)> {
        ServiceName::ALL
            .into_iter()
            .map(move |service| (service, self.base_url(service)))
    }
}
