//! Internal domain models for CADIN lookups.
//!
//! These types are OUR types - they don't change when a provider changes its
//! response shape. Raw provider payloads get converted into these types by
//! the adapter.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::document::Document;

/// Untyped provider response body. Shape varies by provider and is not trusted.
pub type RawPayload = Map<String, Value>;

/// Placeholder shown when a provider omitted a field.
pub const PLACEHOLDER: &str = "—";

/// The backends we know how to call. Closed set, fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// General gateway (federal and other internal sources)
    GeneralGateway,
    /// SERPRO federal API called directly
    DirectBackend,
    /// PMSP municipal gateway, individuals (needs birth date)
    MunicipalPf,
    /// PMSP municipal gateway, organizations
    MunicipalPj,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::GeneralGateway => "general_gateway",
            Provider::DirectBackend => "direct_backend",
            Provider::MunicipalPf => "municipal_pf",
            Provider::MunicipalPj => "municipal_pj",
        }
    }

    /// Request deadline. Municipal calls solve captcha/auth server-side and are slower.
    pub fn timeout(self) -> Duration {
        match self {
            Provider::GeneralGateway | Provider::DirectBackend => Duration::from_secs(40),
            Provider::MunicipalPf | Provider::MunicipalPj => Duration::from_secs(45),
        }
    }

    /// Path relative to the provider's base URL.
    pub fn path(self, digits: &str) -> String {
        match self {
            Provider::GeneralGateway => format!("/cadin/{digits}"),
            Provider::DirectBackend => format!("/cadin/v1/consulta/{digits}"),
            Provider::MunicipalPf => format!("/cadin/pmspspf/{digits}"),
            Provider::MunicipalPj => format!("/cadin/pmspspj/{digits}"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which source actually produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    GeneralGateway,
    DirectBackend,
    MunicipalPf,
    MunicipalPj,
    /// Synthetic record, no registry was consulted
    Demo,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::GeneralGateway => "general_gateway",
            Provenance::DirectBackend => "direct_backend",
            Provenance::MunicipalPf => "municipal_pf",
            Provenance::MunicipalPj => "municipal_pj",
            Provenance::Demo => "demo",
        }
    }
}

impl From<Provider> for Provenance {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::GeneralGateway => Provenance::GeneralGateway,
            Provider::DirectBackend => Provenance::DirectBackend,
            Provider::MunicipalPf => Provenance::MunicipalPf,
            Provider::MunicipalPj => Provenance::MunicipalPj,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Registry standing of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Situation {
    Regular,
    Irregular,
    /// Anything else. Holds the upper-cased provider text, or `None` when
    /// the provider sent no status at all.
    Unknown(Option<String>),
}

impl Situation {
    /// Build from an already upper-cased provider value.
    pub fn from_upper(value: String) -> Self {
        match value.as_str() {
            "REGULAR" => Situation::Regular,
            "IRREGULAR" => Situation::Irregular,
            _ => Situation::Unknown(Some(value)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Situation::Regular => "REGULAR",
            Situation::Irregular => "IRREGULAR",
            Situation::Unknown(Some(value)) => value,
            Situation::Unknown(None) => PLACEHOLDER,
        }
    }
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for Situation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized lookup result, identical in shape for every provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    /// Digits-only document number
    pub document: String,
    /// Name or corporate name, [`PLACEHOLDER`] when absent
    pub display_name: String,
    pub status: Situation,
    /// Pending items, passed through as the provider sent them
    pub pending_items: Vec<Value>,
    /// Original payload kept for audit/debugging
    pub raw: RawPayload,
}

impl CanonicalRecord {
    pub fn pending_count(&self) -> usize {
        self.pending_items.len()
    }
}

/// A record plus where it came from.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub record: CanonicalRecord,
    pub provenance: Provenance,
    /// Non-fatal failures from sources tried before the one that answered
    pub warnings: Vec<CadinError>,
}

/// Result of the municipal flow when it did not fail.
#[derive(Debug, Clone)]
pub enum MunicipalResolution {
    /// Municipal gateway not configured; the caller should use the general flow
    NotApplicable,
    Resolved(ResolutionOutcome),
}

/// Birth date in strict `dd/mm/yyyy` form, as the municipal gateway expects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BirthDate(String);

impl BirthDate {
    /// Accepts exactly two digits, slash, two digits, slash, four digits
    /// (surrounding whitespace ignored) naming a real calendar date.
    pub fn parse(input: &str) -> Result<Self, CadinError> {
        let value = input.trim();
        let bytes = value.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                2 | 5 => *b == b'/',
                _ => b.is_ascii_digit(),
            });

        if !shape_ok || chrono::NaiveDate::parse_from_str(value, "%d/%m/%Y").is_err() {
            return Err(CadinError::missing_birth_date());
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parameters for a single provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub provider: Provider,
    pub document: Document,
    /// Required for [`Provider::MunicipalPf`] only
    pub birth_date: Option<BirthDate>,
}

impl ProviderRequest {
    pub fn new(provider: Provider, document: Document) -> Self {
        Self {
            provider,
            document,
            birth_date: None,
        }
    }

    pub fn with_birth_date(mut self, birth_date: BirthDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }
}

/// Why a provider call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallFailure {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Errors that can occur during a lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CadinError {
    #[error("Invalid document '{0}': expected a CPF (11 digits) or CNPJ (14 digits)")]
    InvalidDocument(String),

    #[error("Provider {0} is not configured")]
    ProviderNotConfigured(Provider),

    #[error("Provider {provider} failed: {cause}")]
    ProviderCallFailed {
        provider: Provider,
        cause: CallFailure,
    },

    #[error("Missing or malformed parameter: {0}")]
    MissingRequiredParameter(&'static str),

    #[error("No valid CPF/CNPJ found in the input")]
    NoValidInput,
}

impl CadinError {
    pub fn call_failed(provider: Provider, cause: CallFailure) -> Self {
        Self::ProviderCallFailed { provider, cause }
    }

    pub fn missing_birth_date() -> Self {
        Self::MissingRequiredParameter("birth date (dd/mm/yyyy) for municipal person lookup")
    }

    /// Input errors are the caller's fault; nothing was sent over the network.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CadinError::InvalidDocument(_)
                | CadinError::MissingRequiredParameter(_)
                | CadinError::NoValidInput
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_paths() {
        assert_eq!(Provider::GeneralGateway.path("123"), "/cadin/123");
        assert_eq!(Provider::DirectBackend.path("123"), "/cadin/v1/consulta/123");
        assert_eq!(Provider::MunicipalPf.path("123"), "/cadin/pmspspf/123");
        assert_eq!(Provider::MunicipalPj.path("123"), "/cadin/pmspspj/123");
    }

    #[test]
    fn test_provider_timeouts() {
        assert_eq!(Provider::GeneralGateway.timeout(), Duration::from_secs(40));
        assert_eq!(Provider::DirectBackend.timeout(), Duration::from_secs(40));
        assert_eq!(Provider::MunicipalPf.timeout(), Duration::from_secs(45));
        assert_eq!(Provider::MunicipalPj.timeout(), Duration::from_secs(45));
    }

    #[test]
    fn test_provenance_from_provider() {
        assert_eq!(Provenance::from(Provider::DirectBackend), Provenance::DirectBackend);
        assert_eq!(Provenance::from(Provider::MunicipalPj).as_str(), "municipal_pj");
        assert_eq!(Provenance::Demo.to_string(), "demo");
    }

    #[test]
    fn test_situation_from_upper() {
        assert_eq!(Situation::from_upper("REGULAR".into()), Situation::Regular);
        assert_eq!(Situation::from_upper("IRREGULAR".into()), Situation::Irregular);
        let other = Situation::from_upper("SUSPENSO".into());
        assert_eq!(other.as_str(), "SUSPENSO");
        assert_eq!(Situation::Unknown(None).as_str(), PLACEHOLDER);
    }

    #[test]
    fn test_birth_date_accepts_strict_format() {
        let date = BirthDate::parse(" 01/02/1990 ").unwrap();
        assert_eq!(date.as_str(), "01/02/1990");
    }

    #[test]
    fn test_birth_date_rejects_other_shapes() {
        for bad in ["", "2024-01-01", "1/1/2024", "01/01/24", "01-01-2024", "31/02/2024", "aa/bb/cccc"] {
            let err = BirthDate::parse(bad).unwrap_err();
            assert!(
                matches!(err, CadinError::MissingRequiredParameter(_)),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_error_messages() {
        let err = CadinError::call_failed(
            Provider::GeneralGateway,
            CallFailure::Status {
                code: 503,
                body: "down".into(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("general_gateway"));
        assert!(msg.contains("503"));
        assert!(!err.is_input_error());
        assert!(CadinError::NoValidInput.is_input_error());
    }
}
