//! cadin-lookup - CADIN registry lookups for CPF/CNPJ documents.
//!
//! Resolves a taxpayer document against the municipal (PMSP) gateway, the
//! general gateway and the direct SERPRO backend, in that order of
//! preference, falling back to a demo record when nothing answers. Works on
//! a single document or a CSV batch.

pub mod cadin;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod report;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; stdout is reserved for results
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::from_default_env().add_directive("cadin_lookup=info".parse()?))
        .init();

    cli::run_command(&args)
}
