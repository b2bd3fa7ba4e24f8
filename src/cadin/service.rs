//! Resolution service - orchestrates CADIN lookups across providers
//!
//! Two flows, each a linear fallback chain:
//! 1. **General**: general gateway → direct SERPRO backend → demo record.
//!    Always produces a result.
//! 2. **Municipal** (PMSP): PF endpoint for persons (birth date required),
//!    PJ endpoint for entities. Failure ends this flow only; it never falls
//!    back by itself.
//!
//! [`ResolutionService::resolve`] ties them together: municipal first when
//! enabled, the general flow as the unconditional safety net.

use super::adapter;
use super::cache::{CacheKey, ResultCache};
use super::client::HttpProviderClient;
use super::domain::{
    BirthDate, CadinError, MunicipalResolution, Provenance, Provider, ProviderRequest,
    RawPayload, ResolutionOutcome,
};
use super::settings::ProviderSettings;
use super::traits::ProviderApi;
use crate::document::{self, Document, DocumentKind};

/// Providers tried by the general flow, in priority order.
const GENERAL_CHAIN: [Provider; 2] = [Provider::GeneralGateway, Provider::DirectBackend];

/// Service resolving documents against the configured providers
pub struct ResolutionService<A = HttpProviderClient> {
    settings: ProviderSettings,
    api: A,
    cache: ResultCache,
}

impl ResolutionService<HttpProviderClient> {
    /// Create a service talking HTTP to the endpoints in `settings`
    pub fn new(settings: ProviderSettings) -> Result<Self, reqwest::Error> {
        let api = HttpProviderClient::new(&settings)?;
        Ok(Self::with_api(settings, api))
    }
}

impl<A: ProviderApi> ResolutionService<A> {
    /// Create a service over any transport
    pub fn with_api(settings: ProviderSettings, api: A) -> Self {
        Self {
            cache: ResultCache::new(settings.cache_ttl),
            settings,
            api,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &ResultCache {
        &self.cache
    }

    #[cfg(test)]
    pub(crate) fn api(&self) -> &A {
        &self.api
    }

    /// Top-level lookup for raw user input
    ///
    /// Rejects anything that is not a CPF/CNPJ before touching the network,
    /// then runs [`Self::resolve`].
    pub async fn lookup(
        &self,
        identifier: &str,
        birth_date: Option<&str>,
    ) -> Result<ResolutionOutcome, CadinError> {
        let doc = Document::parse(identifier)?;
        Ok(self.resolve(&doc, birth_date).await)
    }

    /// Top-level dispatch for a validated document
    ///
    /// Municipal flow first when enabled; if it is not applicable or fails
    /// for any reason, the general flow runs. Never fails.
    pub async fn resolve(&self, doc: &Document, birth_date: Option<&str>) -> ResolutionOutcome {
        let mut warnings = Vec::new();

        if self.settings.municipal_enabled {
            match self.resolve_municipal(doc.digits(), birth_date).await {
                Ok(MunicipalResolution::Resolved(outcome)) => return outcome,
                Ok(MunicipalResolution::NotApplicable) => {
                    tracing::debug!("Municipal gateway not configured, using general flow");
                }
                Err(e) => {
                    tracing::warn!("Municipal lookup for {} failed: {}", doc, e);
                    warnings.push(e);
                }
            }
        }

        let mut outcome = self.resolve_general(doc).await;
        warnings.append(&mut outcome.warnings);
        outcome.warnings = warnings;
        outcome
    }

    /// General flow: gateway, then direct backend, then demo record
    ///
    /// Every provider failure is logged and kept as a warning on the outcome.
    pub async fn resolve_general(&self, doc: &Document) -> ResolutionOutcome {
        let mut warnings = Vec::new();

        for provider in GENERAL_CHAIN {
            let request = ProviderRequest::new(provider, doc.clone());
            match self.fetch(&request).await {
                Ok(raw) => {
                    tracing::info!("Resolved {} via {}", doc, provider);
                    return ResolutionOutcome {
                        record: adapter::normalize(raw, doc.digits()),
                        provenance: provider.into(),
                        warnings,
                    };
                }
                Err(CadinError::ProviderNotConfigured(_)) => {
                    tracing::debug!("Skipping {}: not configured", provider);
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    warnings.push(e);
                }
            }
        }

        tracing::info!("No provider reachable for {}, using demo record", doc);
        ResolutionOutcome {
            record: adapter::demo_record(doc),
            provenance: Provenance::Demo,
            warnings,
        }
    }

    /// Municipal (PMSP) flow
    ///
    /// - Gateway not configured: `Ok(NotApplicable)`, nothing else checked.
    /// - Person: requires a `dd/mm/yyyy` birth date, checked before any call.
    /// - Entity: PJ endpoint, no extra parameter.
    ///
    /// Provider failures are returned as errors; falling back is the caller's call.
    pub async fn resolve_municipal(
        &self,
        identifier: &str,
        birth_date: Option<&str>,
    ) -> Result<MunicipalResolution, CadinError> {
        if !self.settings.municipal.is_configured() {
            return Ok(MunicipalResolution::NotApplicable);
        }

        let digits = document::canonicalize(identifier);
        let request = match document::classify(&digits) {
            DocumentKind::Person => {
                let birth_date = birth_date
                    .ok_or_else(CadinError::missing_birth_date)
                    .and_then(BirthDate::parse)?;
                ProviderRequest::new(Provider::MunicipalPf, Document::parse(&digits)?)
                    .with_birth_date(birth_date)
            }
            DocumentKind::Entity => {
                ProviderRequest::new(Provider::MunicipalPj, Document::parse(&digits)?)
            }
            DocumentKind::Invalid => {
                return Err(CadinError::InvalidDocument(identifier.trim().to_string()));
            }
        };

        let raw = self.fetch(&request).await?;
        tracing::info!("Resolved {} via {}", request.document, request.provider);

        Ok(MunicipalResolution::Resolved(ResolutionOutcome {
            record: adapter::normalize(raw, &digits),
            provenance: request.provider.into(),
            warnings: Vec::new(),
        }))
    }

    /// One provider call: configuration check, then cache, then network.
    ///
    /// Only successful payloads are cached.
    async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, CadinError> {
        if !self.settings.is_configured(request.provider) {
            return Err(CadinError::ProviderNotConfigured(request.provider));
        }

        let key = CacheKey::from(request);
        if let Some(raw) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {} on {}", request.document, request.provider);
            return Ok(raw);
        }

        let raw = self.api.fetch(request).await?;
        self.cache.put(key, raw.clone());
        tracing::debug!("Cached {} response ({} entries)", request.provider, self.cache.len());
        Ok(raw)
    }
}
