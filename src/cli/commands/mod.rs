//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `lookup`: Single document lookup
//! - `batch`: CSV in, CSV report out
//! - `providers`: Show what is configured

mod batch;
mod lookup;
mod providers;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::cadin::ProviderSettings;
use crate::config::{self, Overrides};

pub use batch::cmd_batch;
pub use lookup::cmd_lookup;
pub use providers::cmd_providers;

/// CADIN lookups for CPF/CNPJ documents
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/cadin-lookup/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub providers: ProviderArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Provider endpoints; each wins over the config file.
#[derive(Args, Debug, Default)]
pub struct ProviderArgs {
    /// General gateway base URL
    #[arg(long, env = "GATEWAY_URL", global = true)]
    pub gateway_url: Option<String>,
    /// General gateway API key
    #[arg(long, env = "INTERNAL_API_KEY", global = true, hide_env_values = true)]
    pub gateway_api_key: Option<String>,
    /// Direct SERPRO base URL
    #[arg(long, env = "SERPRO_CADIN_BASE", global = true)]
    pub serpro_url: Option<String>,
    /// Direct SERPRO bearer token
    #[arg(long, env = "SERPRO_TOKEN", global = true, hide_env_values = true)]
    pub serpro_token: Option<String>,
    /// PMSP municipal gateway base URL
    #[arg(long, env = "PMSP_GATEWAY_URL", global = true)]
    pub pmsp_url: Option<String>,
    /// PMSP municipal gateway API key
    #[arg(long, env = "PMSP_API_KEY", global = true, hide_env_values = true)]
    pub pmsp_api_key: Option<String>,
    /// Skip the municipal (PMSP) flow even if configured
    #[arg(long, global = true)]
    pub no_municipal: bool,
}

impl ProviderArgs {
    fn overrides(&self, batch_concurrency: Option<usize>) -> Overrides {
        Overrides {
            gateway_url: self.gateway_url.clone(),
            gateway_api_key: self.gateway_api_key.clone(),
            serpro_url: self.serpro_url.clone(),
            serpro_token: self.serpro_token.clone(),
            pmsp_url: self.pmsp_url.clone(),
            pmsp_api_key: self.pmsp_api_key.clone(),
            disable_municipal: self.no_municipal,
            batch_concurrency,
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Look up a single CPF or CNPJ
    Lookup {
        /// CPF or CNPJ, punctuation optional
        document: String,
        /// Birth date (dd/mm/yyyy), required by the municipal CPF lookup.
        /// Must be a real calendar date (31/02/2024 is rejected locally)
        #[arg(short, long)]
        birth_date: Option<String>,
        /// Confirm the data subject authorized this lookup
        #[arg(long)]
        consent: bool,
        /// Also print the raw provider payload
        #[arg(long)]
        raw: bool,
    },
    /// Look up every document in a CSV file
    Batch {
        /// CSV with a `documento` column and an optional `dtnasc` column
        input: PathBuf,
        /// Where to write the report
        #[arg(short, long, default_value = "resultado_cadin.csv")]
        output: PathBuf,
        /// Confirm the data subjects authorized these lookups
        #[arg(long)]
        consent: bool,
        /// Documents resolved at the same time
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },
    /// Show which providers are configured
    Providers,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Lookup {
            document,
            birth_date,
            consent,
            raw,
        } => {
            require_consent(*consent)?;
            let settings = load_settings(cli, None)?;
            let rt = Runtime::new()?;
            cmd_lookup(&rt, settings, document, birth_date.as_deref(), *raw)
        }
        Commands::Batch {
            input,
            output,
            consent,
            concurrency,
        } => {
            require_consent(*consent)?;
            let settings = load_settings(cli, *concurrency)?;
            let rt = Runtime::new()?;
            cmd_batch(&rt, settings, input, output)
        }
        Commands::Providers => {
            let settings = load_settings(cli, None)?;
            cmd_providers(&settings);
            Ok(())
        }
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Lookups touch personal data; refuse to run without explicit consent.
fn require_consent(consent: bool) -> anyhow::Result<()> {
    if !consent {
        anyhow::bail!(
            "Refusing to run without --consent: confirm the lookup is authorized by the data subject"
        );
    }
    Ok(())
}

/// Config file, then environment/flags on top, frozen into provider settings.
fn load_settings(cli: &Cli, batch_concurrency: Option<usize>) -> anyhow::Result<ProviderSettings> {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    config.apply_overrides(&cli.providers.overrides(batch_concurrency));
    Ok(config.provider_settings())
}
