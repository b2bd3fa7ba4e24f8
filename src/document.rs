//! Taxpayer document handling (CPF / CNPJ).
//!
//! Everything here is pure: canonicalize user input to digits, classify it by
//! length, and format it back for display. A [`Document`] can only be built
//! from a valid identifier, so code that holds one never re-validates.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::cadin::CadinError;

/// Number of digits in a CPF (individual taxpayer).
pub const PERSON_LEN: usize = 11;
/// Number of digits in a CNPJ (organization).
pub const ENTITY_LEN: usize = 14;

/// Kind of taxpayer identifier, decided purely by digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// CPF, 11 digits
    Person,
    /// CNPJ, 14 digits
    Entity,
    Invalid,
}

impl DocumentKind {
    /// Short label used in reports and result headers.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Person => "CPF",
            DocumentKind::Entity => "CNPJ",
            DocumentKind::Invalid => "Documento",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl Serialize for DocumentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Strip every non-digit character.
pub fn canonicalize(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Classify an already canonical digit string.
///
/// Anything containing a non-digit is `Invalid`.
pub fn classify(digits: &str) -> DocumentKind {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return DocumentKind::Invalid;
    }
    match digits.len() {
        PERSON_LEN => DocumentKind::Person,
        ENTITY_LEN => DocumentKind::Entity,
        _ => DocumentKind::Invalid,
    }
}

/// Apply the usual punctuation: `000.000.000-00` or `00.000.000/0000-00`.
///
/// Anything that does not classify as a CPF/CNPJ is returned unchanged.
pub fn format(digits: &str) -> String {
    match classify(digits) {
        DocumentKind::Person => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        ),
        DocumentKind::Entity => format!(
            "{}.{}.{}/{}-{}",
            &digits[..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..]
        ),
        DocumentKind::Invalid => digits.to_string(),
    }
}

/// A validated, canonical CPF or CNPJ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    digits: String,
    kind: DocumentKind,
}

impl Document {
    /// Canonicalize and classify `input`, rejecting anything that is not 11 or 14 digits.
    pub fn parse(input: &str) -> Result<Self, CadinError> {
        let digits = canonicalize(input);
        match classify(&digits) {
            DocumentKind::Invalid => Err(CadinError::InvalidDocument(input.trim().to_string())),
            kind => Ok(Self { digits, kind }),
        }
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn is_person(&self) -> bool {
        self.kind == DocumentKind::Person
    }

    /// Display form with punctuation.
    pub fn formatted(&self) -> String {
        format(&self.digits)
    }

    /// Whether the last digit is odd; drives the demo record.
    pub fn last_digit_is_odd(&self) -> bool {
        self.digits
            .bytes()
            .last()
            .is_some_and(|b| (b - b'0') % 2 == 1)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.formatted())
    }
}
