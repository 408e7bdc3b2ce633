use switchyard_core::{failover::FailoverState, runtime::SwitchyardRuntime};

use super::utils::{print_info, print_success, print_warning, CliResult};

pub struct CheckOptions {
    /// Drop the cached selection before resolving.
    pub force: bool,
    /// Print the resolution as JSON.
    pub json: bool,
}

/// Resolves the API base URL and persists the result.
pub async fn handle_check_command(
    runtime: &SwitchyardRuntime,
    options: CheckOptions,
) -> CliResult<()> {
    let checker = runtime.checker();

    if !checker.should_check() {
        print_info(&format!(
            "Availability checking does not apply; using {}",
            checker.available_url()
        ));
        return Ok(());
    }

    let resolution =
        if options.force { checker.recheck().await } else { checker.silent_check().await };

    runtime.persist()?;

    let Some(resolution) = resolution else {
        print_warning("No endpoint could be resolved");
        return Ok(());
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    match resolution.final_state() {
        FailoverState::Committed => print_success(&format!(
            "Using {} ({}, {} probe(s))",
            resolution.url, resolution.source, resolution.attempts
        )),
        _ => print_warning(&format!(
            "No endpoint reachable; falling back to {} (not cached)",
            resolution.url
        )),
    }

    Ok(())
}
