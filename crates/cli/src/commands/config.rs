use clap::Subcommand;
use std::path::Path;
use switchyard_core::config::{AppConfig, UploadMethod, SAMPLE_CONFIG};

use super::utils::{mask_secret, print_error, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the current configuration
    Validate {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show current configuration
    Show {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,

        /// Show API keys, passwords and tokens
        #[arg(long)]
        show_sensitive: bool,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file, show_sensitive } => show_config(&file, show_sensitive),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn secret(value: &str, show_sensitive: bool) -> String {
    if value.is_empty() {
        "(unset)".to_string()
    } else if show_sensitive {
        value.to_string()
    } else {
        mask_secret(value)
    }
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));

    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    println!("Configuration Summary:");
    println!("  API endpoints: {}", config.api.static_base_urls.len());
    println!("  Probe strategy: {:?}", config.api.probe_strategy);
    println!("  Selection policy: {}", config.api.selection_policy);
    println!("  Selection cache: {}", enabled(config.api.check_cache_enabled));
    println!("  Middleware: {}", enabled(config.api.middleware_enabled));
    println!("  Upload: {} ({})", enabled(config.upload.enabled), config.upload.method.as_str());

    Ok(())
}

fn show_config(file: &str, show_sensitive: bool) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    println!("Configuration from {file}:");

    let api = &config.api;
    println!("\n[API]");
    println!("  URL Mode: {:?}", api.url_mode);
    println!("  Backend: {:?}", api.backend);
    for (priority, url) in api.static_base_urls.iter().enumerate() {
        println!("  Endpoint {priority}: {url}");
    }
    if api.middleware_enabled || !api.base_url.is_empty() {
        println!("  Base URL: {}", api.base_url);
    }
    println!("  Middleware: {}", enabled(api.middleware_enabled));
    for (from, to) in &api.path_mappings {
        println!("    {from} -> {to}");
    }
    println!("  Probe: GET {} ({}ms, {} attempt(s))", api.probe_path, api.probe_timeout_ms, api.probe_attempts);
    println!("  Strategy: {:?} / {}", api.probe_strategy, api.selection_policy);
    println!("  Failover Delay: {}ms", api.failover_delay_ms);
    if api.check_cache_enabled {
        println!("  Selection Cache: {}ms", api.check_cache_duration_ms);
    } else {
        println!("  Selection Cache: session lifetime");
    }

    println!("\n[Request]");
    println!("  Timeout: {}s", config.request.timeout_seconds);
    println!("  Custom Headers: {}", enabled(config.request.custom_headers.enabled));
    for (name, value) in &config.request.custom_headers.headers {
        println!("    {name}: {}", secret(value, show_sensitive));
    }

    let upload = &config.upload;
    println!("\n[Upload]");
    println!("  Enabled: {}", upload.enabled);
    println!("  Method: {}", upload.method.as_str());
    println!("  Max Files: {}", upload.max_files);
    println!("  Max Size: {} bytes", upload.max_size);
    match upload.method {
        UploadMethod::Webdav => {
            println!("  WebDAV: {} as {}", upload.webdav.server_url, upload.webdav.username);
            println!("    Password: {}", secret(&upload.webdav.password, show_sensitive));
            println!("    Public URL: {}", upload.webdav.public_url);
        }
        UploadMethod::Imagebed => {
            println!(
                "  Failover: {} ({}, retry delay {}ms)",
                enabled(upload.strategy.enable_failover),
                upload.strategy.method,
                upload.strategy.retry_delay_ms
            );
            for bed in &upload.image_beds {
                println!(
                    "  {} [{}] priority {} {}: {}",
                    bed.display_name(),
                    bed.kind.as_str(),
                    bed.priority,
                    enabled(bed.enabled),
                    bed.api_url
                );
                println!("    API Key: {}", secret(&bed.api_key, show_sensitive));
            }
        }
    }

    println!("\n[Session]");
    if let Some(path) = &config.session.state_file {
        println!("  State File: {}", path.display());
    }
    if let Some(path) = &config.session.cache_file {
        println!("  Cache File: {}", path.display());
    }
    println!("  Language: {}", config.session.language);
    println!("  Site: {}", config.session.site_name);
    if let Some(token) = &config.session.token {
        println!("  Token: {}", secret(token, show_sensitive));
    }

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    let path = Path::new(output);
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, SAMPLE_CONFIG)?;

    print_success(&format!("Sample configuration generated: {output}"));
    print_info("Remember to:");
    print_info("  1. Replace the example endpoints with your backend's base URLs");
    print_info("  2. Fill in image host API keys or WebDAV credentials before enabling uploads");

    Ok(())
}
