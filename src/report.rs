//! CSV input and output for batch lookups.
//!
//! Input needs a `documento` column; `dtnasc` is optional. The report is
//! written with a UTF-8 byte-order mark so spreadsheet tools pick the right
//! encoding.

use std::io::{Read, Write};

use crate::cadin::{BatchInput, BatchRow};
use crate::error::{Error, Result};

pub const DOCUMENT_COLUMN: &str = "documento";
pub const BIRTH_DATE_COLUMN: &str = "dtnasc";

/// Column order of the exported report.
pub const REPORT_HEADER: [&str; 6] = [
    "documento",
    "tipo",
    "nome",
    "situacao",
    "qtd_pendencias",
    "fonte",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read batch inputs from CSV.
///
/// Blank cells are kept; invalid documents are filtered later by the batch run.
pub fn read_inputs<R: Read>(reader: R) -> Result<Vec<BatchInput>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
    };

    let document_idx =
        position(DOCUMENT_COLUMN).ok_or_else(|| Error::missing_column(DOCUMENT_COLUMN))?;
    let birth_idx = position(BIRTH_DATE_COLUMN);

    let mut inputs = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let document = record.get(document_idx).unwrap_or_default();
        let mut input = BatchInput::new(row, document);

        if let Some(date) = birth_idx
            .and_then(|i| record.get(i))
            .filter(|d| !d.is_empty())
        {
            input = input.with_birth_date(date);
        }

        inputs.push(input);
    }

    tracing::debug!("Read {} input row(s)", inputs.len());
    Ok(inputs)
}

/// Write the batch report as CSV, prefixed with a UTF-8 byte-order mark.
pub fn write_report<W: Write>(mut writer: W, rows: &[BatchRow]) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(REPORT_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
