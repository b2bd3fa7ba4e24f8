//! Immutable provider configuration consumed by the resolution service.
//!
//! Built once at startup (see [`crate::config::Config::provider_settings`])
//! and passed in explicitly, so the service never reads the environment.

use std::time::Duration;

use super::domain::Provider;

/// Default lifetime of a cached provider response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Base URL plus credential for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    /// API key or bearer token, depending on the provider
    pub credential: String,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: credential.into(),
        }
    }

    /// Both URL and credential present.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.credential.trim().is_empty()
    }

    /// Full URL for `path`, ignoring a trailing slash on the base.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), path)
    }
}

/// Everything the resolution service needs to know about its providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub gateway: Endpoint,
    pub direct: Endpoint,
    /// Shared by the PF and PJ municipal endpoints
    pub municipal: Endpoint,
    /// Try the municipal flow before the general one
    pub municipal_enabled: bool,
    pub cache_ttl: Duration,
    /// Rows resolved at once in a batch (1 = sequential)
    pub batch_concurrency: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            gateway: Endpoint::default(),
            direct: Endpoint::default(),
            municipal: Endpoint::default(),
            municipal_enabled: false,
            cache_ttl: DEFAULT_CACHE_TTL,
            batch_concurrency: 1,
        }
    }
}

impl ProviderSettings {
    /// Endpoint serving `provider`.
    pub fn endpoint(&self, provider: Provider) -> &Endpoint {
        match provider {
            Provider::GeneralGateway => &self.gateway,
            Provider::DirectBackend => &self.direct,
            Provider::MunicipalPf | Provider::MunicipalPj => &self.municipal,
        }
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        self.endpoint(provider).is_configured()
    }

    /// Municipal flow will actually be attempted.
    pub fn municipal_active(&self) -> bool {
        self.municipal_enabled && self.municipal.is_configured()
    }
}
