//! CADIN lookup module - resolves CPF/CNPJ documents against registry providers.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Our types: records, provenance, errors
//! - **Settings** (`settings.rs`) - Immutable provider endpoints and knobs
//! - **Client** (`client.rs`) - HTTP calls to the four provider endpoints
//! - **Adapter** (`adapter.rs`) - Raw provider payloads to canonical records
//! - **Cache** (`cache.rs`) - Short-lived memoization of successful responses
//! - **Service** (`service.rs`) - Provider fallback chains and dispatch
//! - **Batch** (`batch.rs`) - The same dispatch applied row by row
//!
//! # Usage
//!
//! ```ignore
//! use cadin::{ProviderSettings, ResolutionService, settings::Endpoint};
//!
//! let settings = ProviderSettings {
//!     gateway: Endpoint::new("https://gateway.example", "api-key"),
//!     ..Default::default()
//! };
//! let service = ResolutionService::new(settings)?;
//!
//! let outcome = service.lookup("123.456.789-09", None).await?;
//! println!("{} via {}", outcome.record.status, outcome.provenance);
//! ```

pub mod adapter;
pub mod batch;
pub mod cache;
pub mod client;
pub mod domain;
pub mod service;
pub mod settings;
pub mod traits;

pub use batch::{BatchInput, BatchReport, BatchRow};
pub use domain::{
    CadinError, CallFailure, CanonicalRecord, MunicipalResolution, Provenance, Provider,
    ResolutionOutcome, Situation,
};
pub use service::ResolutionService;
pub use settings::ProviderSettings;
