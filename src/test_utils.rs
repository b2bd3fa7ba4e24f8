//! Test utilities and fixtures for cadin-lookup tests.
//!
//! Common documents, provider settings, and payload helpers to reduce
//! boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{configured_settings, payload, CPF_EVEN};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let api = MockProviderApi::new()
//!         .with_payload(Provider::GeneralGateway, payload(json!({"nome": "A"})));
//!     let svc = ResolutionService::with_api(configured_settings(), api);
//!     // ... test logic
//! }
//! ```

use serde_json::Value;

use crate::cadin::domain::RawPayload;
use crate::cadin::settings::{Endpoint, ProviderSettings};

/// CPF ending in an even digit (demo: REGULAR)
pub const CPF_EVEN: &str = "12345678900";
/// CPF ending in an odd digit (demo: IRREGULAR)
pub const CPF_ODD: &str = "12345678909";
/// CNPJ ending in an even digit
pub const CNPJ_EVEN: &str = "12345678000190";

/// Settings with every provider configured and the municipal flow enabled.
///
/// The URLs are never contacted; tests pair these with a mock transport.
pub fn configured_settings() -> ProviderSettings {
    ProviderSettings {
        gateway: Endpoint::new("https://gateway.test", "gateway-key"),
        direct: Endpoint::new("https://serpro.test", "serpro-token"),
        municipal: Endpoint::new("https://pmsp.test", "pmsp-key"),
        municipal_enabled: true,
        ..Default::default()
    }
}

/// Turn a `json!({...})` literal into a raw payload.
///
/// # Panics
///
/// If `value` is not a JSON object.
pub fn payload(value: Value) -> RawPayload {
    match value {
        Value::Object(map) => map,
        other => panic!("payload fixture must be a JSON object, got {other}"),
    }
}
