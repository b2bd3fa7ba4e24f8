//! Single document lookup command.

use tokio::runtime::Runtime;

use crate::cadin::{CadinError, Provenance, ProviderSettings, ResolutionService};
use crate::document;

/// Look up one CPF/CNPJ and print the result
pub fn cmd_lookup(
    rt: &Runtime,
    settings: ProviderSettings,
    input: &str,
    birth_date: Option<&str>,
    raw: bool,
) -> anyhow::Result<()> {
    let service = ResolutionService::new(settings)?;
    let outcome = rt
        .block_on(service.lookup(input, birth_date))
        .map_err(lookup_failure)?;

    for warning in &outcome.warnings {
        eprintln!("⚠ {}", warning);
    }

    let digits = document::canonicalize(input);
    let record = &outcome.record;

    println!("{} {}", document::classify(&digits), document::format(&digits));
    println!("  Source:  {}", outcome.provenance);
    if outcome.provenance == Provenance::Demo {
        println!("           (no provider answered, showing demo data)");
    }
    println!("  Name:    {}", record.display_name);
    println!("  Status:  {}", record.status);
    println!("  Pending: {}", record.pending_count());

    for item in &record.pending_items {
        println!("    - {}", serde_json::to_string(item)?);
    }

    if raw {
        println!();
        println!("{}", serde_json::to_string_pretty(&record.raw)?);
    }

    Ok(())
}

/// Input errors are reported as such; nothing was sent to any provider.
fn lookup_failure(err: CadinError) -> anyhow::Error {
    if err.is_input_error() {
        anyhow::anyhow!("Nothing was looked up: {}", err)
    } else {
        err.into()
    }
}
