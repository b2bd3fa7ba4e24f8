//! Adapter layer: convert raw provider payloads to domain records.
//!
//! This is the ONLY place where provider response shapes are interpreted.
//! Providers disagree on field names, so each canonical field is resolved
//! through an ordered alias list; the first alias holding a usable value wins.
//! Normalization never fails - missing fields degrade to defaults.

use serde_json::{Value, json};

use super::domain::{CanonicalRecord, PLACEHOLDER, RawPayload, Situation};
use crate::document::{self, Document};

const DOCUMENT_ALIASES: &[&str] = &["documento", "cpf", "cnpj"];
const NAME_ALIASES: &[&str] = &["nome", "razao_social", "razaoSocial"];
const STATUS_ALIASES: &[&str] = &["situacao", "status"];
const PENDING_ALIASES: &[&str] = &["pendencias", "itens", "debts"];

/// Convert any provider payload into a [`CanonicalRecord`].
///
/// `fallback_document` is used when the payload carries no document number.
pub fn normalize(raw: RawPayload, fallback_document: &str) -> CanonicalRecord {
    let document = first_text(&raw, DOCUMENT_ALIASES)
        .map(|value| document::canonicalize(&value))
        .unwrap_or_else(|| document::canonicalize(fallback_document));

    let display_name =
        first_text(&raw, NAME_ALIASES).unwrap_or_else(|| PLACEHOLDER.to_string());

    let status = first_text(&raw, STATUS_ALIASES)
        .map(|value| Situation::from_upper(value.to_uppercase()))
        .unwrap_or(Situation::Unknown(None));

    let pending_items = first_pending(&raw);

    CanonicalRecord {
        document,
        display_name,
        status,
        pending_items,
        raw,
    }
}

/// Synthetic payload used when no registry could be reached.
///
/// Deterministic: an even last digit is REGULAR with nothing pending, an odd
/// one is IRREGULAR with a single sample item.
pub fn demo_payload(doc: &Document) -> RawPayload {
    let (name, agency) = if doc.is_person() {
        ("Pessoa Física (demo)", "PMSP")
    } else {
        ("Empresa Ltda (demo)", "União")
    };
    let irregular = doc.last_digit_is_odd();

    let pending = if irregular {
        json!([{
            "orgao": agency,
            "origem": "Tributo",
            "numero": "000123/2024",
            "data": "2024-08-12",
            "valor": 199.9
        }])
    } else {
        json!([])
    };

    let mut payload = RawPayload::new();
    payload.insert("documento".into(), Value::String(doc.digits().to_string()));
    payload.insert("nome".into(), Value::String(name.to_string()));
    payload.insert(
        "situacao".into(),
        Value::String(if irregular { "IRREGULAR" } else { "REGULAR" }.to_string()),
    );
    payload.insert("pendencias".into(), pending);
    payload
}

/// Demo record for `doc`, built through the normal adapter path.
pub fn demo_record(doc: &Document) -> CanonicalRecord {
    normalize(demo_payload(doc), doc.digits())
}

/// A value counts as present when it would not be considered empty:
/// null, `false`, zero, and empty strings/arrays/objects are skipped.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// First present alias with a textual value (numbers are stringified).
fn first_text(raw: &RawPayload, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| raw.get(*key))
        .filter(|value| is_present(value))
        .find_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// First present alias holding a list or a single object.
fn first_pending(raw: &RawPayload) -> Vec<Value> {
    PENDING_ALIASES
        .iter()
        .filter_map(|key| raw.get(*key))
        .filter(|value| is_present(value))
        .find_map(|value| match value {
            Value::Array(items) => Some(items.clone()),
            Value::Object(_) => Some(vec![value.clone()]),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::payload;

    #[test]
    fn test_normalize_gateway_shape() {
        let raw = payload(json!({
            "documento": "123.456.789-09",
            "nome": "Maria",
            "situacao": "irregular",
            "pendencias": [{"orgao": "União"}, {"orgao": "PMSP"}]
        }));
        let record = normalize(raw.clone(), "00000000000");

        assert_eq!(record.document, "12345678909");
        assert_eq!(record.display_name, "Maria");
        assert_eq!(record.status, Situation::Irregular);
        assert_eq!(record.pending_count(), 2);
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn test_normalize_municipal_pj_shape() {
        let raw = payload(json!({
            "cnpj": "12345678000195",
            "razao_social": "ACME Ltda",
            "status": "regular",
            "itens": []
        }));
        let record = normalize(raw, "");

        assert_eq!(record.document, "12345678000195");
        assert_eq!(record.display_name, "ACME Ltda");
        assert_eq!(record.status, Situation::Regular);
        assert!(record.pending_items.is_empty());
    }

    #[test]
    fn test_normalize_empty_payload_uses_defaults() {
        let record = normalize(RawPayload::new(), "123.456.789-09");

        assert_eq!(record.document, "12345678909");
        assert_eq!(record.display_name, PLACEHOLDER);
        assert_eq!(record.status, Situation::Unknown(None));
        assert_eq!(record.status.as_str(), PLACEHOLDER);
        assert!(record.pending_items.is_empty());
    }

    #[test]
    fn test_single_pending_object_promoted_to_list() {
        let raw = payload(json!({
            "debts": {"numero": "1", "valor": 10.5}
        }));
        let record = normalize(raw, "12345678909");

        assert_eq!(record.pending_items, vec![json!({"numero": "1", "valor": 10.5})]);
    }

    #[test]
    fn test_alias_order_first_present_wins() {
        let raw = payload(json!({
            "nome": "",
            "razao_social": "Second",
            "razaoSocial": "Third",
            "situacao": null,
            "status": "pendente",
            "pendencias": [],
            "itens": {"a": 1}
        }));
        let record = normalize(raw, "12345678909");

        assert_eq!(record.display_name, "Second");
        assert_eq!(record.status, Situation::Unknown(Some("PENDENTE".into())));
        assert_eq!(record.pending_count(), 1);
    }

    #[test]
    fn test_unexpected_value_types_do_not_fail() {
        let raw = payload(json!({
            "cpf": 12345678909u64,
            "nome": ["not", "a", "name"],
            "situacao": true,
            "pendencias": "none"
        }));
        let record = normalize(raw, "99999999999");

        assert_eq!(record.document, "12345678909");
        assert_eq!(record.display_name, PLACEHOLDER);
        assert_eq!(record.status, Situation::Unknown(None));
        assert!(record.pending_items.is_empty());
    }

    #[test]
    fn test_demo_even_digit_is_regular() {
        let doc = Document::parse("12345678000190").unwrap();
        let record = demo_record(&doc);

        assert_eq!(record.status, Situation::Regular);
        assert_eq!(record.display_name, "Empresa Ltda (demo)");
        assert!(record.pending_items.is_empty());
        assert_eq!(record.document, "12345678000190");
    }

    #[test]
    fn test_demo_odd_digit_is_irregular_with_one_item() {
        let doc = Document::parse("123.456.789-09").unwrap();
        let record = demo_record(&doc);

        assert_eq!(record.status, Situation::Irregular);
        assert_eq!(record.display_name, "Pessoa Física (demo)");
        assert_eq!(record.pending_count(), 1);
        assert_eq!(record.pending_items[0]["orgao"], "PMSP");
    }
}
