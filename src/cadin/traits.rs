//! Trait definition for the provider transport.
//!
//! The resolution service talks to providers only through [`ProviderApi`],
//! so tests can substitute a scripted mock for the real HTTP client.
//! Provider identity stays a plain enum; this trait is just the seam.
//!
//! # Example
//!
//! ```ignore
//! use cadin_lookup::cadin::traits::ProviderApi;
//!
//! async fn fetch<A: ProviderApi>(api: &A, request: &ProviderRequest) {
//!     let payload = api.fetch(request).await?;
//! }
//! ```

use async_trait::async_trait;

use super::domain::{CadinError, ProviderRequest, RawPayload};

/// A single network call to one provider.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// Fetch the raw payload for `request`. No schema validation happens here.
    async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, CadinError>;
}

#[async_trait]
impl ProviderApi for super::client::HttpProviderClient {
    async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, CadinError> {
        self.fetch(request).await
    }
}
