//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror` (see
//! `cadin::CadinError`), while CLI/main uses `anyhow` for convenient error
//! propagation. [`Error`] covers the file handling around batch runs.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - All errors implement `std::error::Error` for compatibility
//!
//! # Example
//!
//! ```ignore
//! use cadin_lookup::error::{Error, Result, ResultExt};
//!
//! fn load(path: &Path) -> Result<Vec<BatchInput>> {
//!     let file = File::open(path).with_context("opening batch input")?;
//!     report::read_inputs(file)
//! }
//! ```

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input file lacks a required column
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a missing column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn(column.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::missing_column("documento").context("reading entrada.csv");
        let msg = err.to_string();
        assert!(msg.contains("reading entrada.csv"));
        assert!(msg.contains("documento"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::missing_column("dtnasc"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));

        let io: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.with_context("opening input").unwrap_err();
        assert!(matches!(err, Error::WithContext { .. }));
    }
}
