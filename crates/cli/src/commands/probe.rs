use futures::future::join_all;
use prettytable::{row, Table};
use std::time::Duration;
use switchyard_core::{
    config::AppConfig,
    failover::{Candidate, EndpointProbe, HttpProbe, HttpProbeConfig},
};

use super::utils::{print_info, print_warning, CliError, CliResult};

pub struct ProbeOptions {
    /// Overrides the configured base URLs when non-empty.
    pub urls: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub attempts: Option<u32>,
}

/// Probes every base URL concurrently and prints a table.
///
/// Nothing is committed to the selection cache.
pub async fn handle_probe_command(config: &AppConfig, options: ProbeOptions) -> CliResult<()> {
    let api = &config.api;
    let urls = if options.urls.is_empty() { &api.static_base_urls } else { &options.urls };
    if urls.is_empty() {
        print_warning("No URLs given and no static_base_urls configured");
        return Ok(());
    }

    let timeout = Duration::from_millis(options.timeout_ms.unwrap_or(api.probe_timeout_ms).max(1));
    let probe = HttpProbe::new(HttpProbeConfig {
        path: api.probe_path.clone(),
        attempts: options.attempts.unwrap_or(api.probe_attempts),
        connect_timeout_ms: timeout.as_millis().try_into().unwrap_or(u64::MAX),
    })
    .map_err(|e| CliError::Network(e.to_string()))?;

    print_info(&format!(
        "Probing {} endpoint(s) at {} (timeout {}ms)...",
        urls.len(),
        api.probe_path,
        timeout.as_millis()
    ));

    let candidates = Candidate::from_urls(urls.as_slice());
    let results = join_all(candidates.iter().map(|c| probe.probe(c, timeout))).await;

    let mut table = Table::new();
    table.add_row(row!["Priority", "Endpoint", "Status", "Latency"]);

    let mut reachable = 0;
    for result in &results {
        let status = if result.reachable {
            reachable += 1;
            "reachable"
        } else {
            "unreachable"
        };
        let latency = result
            .latency
            .map_or_else(|| "-".to_string(), |latency| format!("{}ms", latency.as_millis()));
        table.add_row(row![result.candidate.priority, result.candidate.id, status, latency]);
    }

    table.printstd();
    println!("{reachable}/{} endpoint(s) reachable", results.len());

    Ok(())
}
