//! Provider configuration overview.

use crate::cadin::{Provider, ProviderSettings};
use crate::config;

/// Print which providers are configured and whether municipal mode is on
pub fn cmd_providers(settings: &ProviderSettings) {
    println!("Providers");
    println!("=========");

    let rows = [
        ("general gateway", Provider::GeneralGateway),
        ("serpro (direct)", Provider::DirectBackend),
        ("pmsp (municipal)", Provider::MunicipalPf),
    ];
    for (label, provider) in rows {
        let endpoint = settings.endpoint(provider);
        if endpoint.is_configured() {
            println!("  ✓ {:<18} {}", label, endpoint.base_url.trim());
        } else {
            println!("  ✗ {:<18} not configured", label);
        }
    }

    println!();
    println!(
        "Municipal mode:    {}",
        if settings.municipal_active() {
            "active"
        } else {
            "inactive"
        }
    );
    println!("Cache TTL:         {}s", settings.cache_ttl.as_secs());
    println!("Batch concurrency: {}", settings.batch_concurrency);

    if let Some(path) = config::config_path() {
        println!("Config file:       {}", path.display());
    }
}
