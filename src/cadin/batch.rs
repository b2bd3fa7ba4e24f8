//! Batch lookups.
//!
//! Every input row goes through the same dispatch as a single lookup. Rows
//! are independent: the general flow always yields a record, so a provider
//! failing for one document only degrades that row. Invalid documents are
//! dropped from the report; a batch with nothing valid is rejected up front.

use futures::stream::{self, StreamExt};
use serde::Serialize;

use super::domain::{CadinError, Provenance, ResolutionOutcome, Situation};
use super::service::ResolutionService;
use super::traits::ProviderApi;
use crate::document::{Document, DocumentKind};

/// One line of batch input, as read from the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    /// Zero-based data row in the source file
    pub row: usize,
    pub document: String,
    /// Only used by the municipal PF lookup
    pub birth_date: Option<String>,
}

impl BatchInput {
    pub fn new(row: usize, document: impl Into<String>) -> Self {
        Self {
            row,
            document: document.into(),
            birth_date: None,
        }
    }

    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }
}

/// One report line. Field names match the exported CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    #[serde(rename = "documento")]
    pub document: String,
    #[serde(rename = "tipo")]
    pub kind: DocumentKind,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "situacao")]
    pub status: Situation,
    #[serde(rename = "qtd_pendencias")]
    pub pending_count: usize,
    #[serde(rename = "fonte")]
    pub source: Provenance,
}

impl BatchRow {
    pub fn from_outcome(doc: &Document, outcome: &ResolutionOutcome) -> Self {
        Self {
            document: doc.formatted(),
            kind: doc.kind(),
            name: outcome.record.display_name.clone(),
            status: outcome.record.status.clone(),
            pending_count: outcome.record.pending_count(),
            source: outcome.provenance,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One row per valid input, in input order
    pub rows: Vec<BatchRow>,
    /// Inputs dropped because they were not a CPF/CNPJ
    pub skipped: usize,
    /// Provider failures recovered from across all rows
    pub warnings: usize,
}

impl BatchReport {
    /// Number of rows per source, in first-seen order.
    pub fn source_counts(&self) -> Vec<(Provenance, usize)> {
        let mut counts: Vec<(Provenance, usize)> = Vec::new();
        for row in &self.rows {
            match counts.iter_mut().find(|(source, _)| *source == row.source) {
                Some((_, n)) => *n += 1,
                None => counts.push((row.source, 1)),
            }
        }
        counts
    }

    pub fn irregular_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == Situation::Irregular)
            .count()
    }
}

impl<A: ProviderApi> ResolutionService<A> {
    /// Resolve every valid input and collect one row each
    ///
    /// Up to `batch_concurrency` rows are in flight at once; the report keeps
    /// input order regardless.
    pub async fn run_batch(&self, inputs: &[BatchInput]) -> Result<BatchReport, CadinError> {
        let mut valid = Vec::with_capacity(inputs.len());
        for input in inputs {
            match Document::parse(&input.document) {
                Ok(doc) => valid.push((doc, input.birth_date.as_deref())),
                Err(_) => tracing::debug!("Skipping row {}: not a CPF/CNPJ", input.row),
            }
        }

        if valid.is_empty() {
            return Err(CadinError::NoValidInput);
        }

        let total = valid.len();
        let skipped = inputs.len() - total;
        let concurrency = self.settings().batch_concurrency.max(1);
        tracing::info!(
            "Resolving {} document(s) ({} skipped, concurrency {})",
            total,
            skipped,
            concurrency
        );

        let outcomes: Vec<(BatchRow, usize)> = stream::iter(valid.iter().enumerate())
            .map(|(i, (doc, birth_date))| async move {
                let outcome = self.resolve(doc, *birth_date).await;

                if (i + 1) % 10 == 0 {
                    tracing::info!("Resolved {}/{} documents", i + 1, total);
                }

                (BatchRow::from_outcome(doc, &outcome), outcome.warnings.len())
            })
            .buffered(concurrency)
            .collect()
            .await;

        let warnings = outcomes.iter().map(|(_, w)| w).sum();
        let rows = outcomes.into_iter().map(|(row, _)| row).collect();

        Ok(BatchReport {
            rows,
            skipped,
            warnings,
        })
    }
}
