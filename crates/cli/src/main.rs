use clap::{Parser, Subcommand};
use std::path::PathBuf;
use switchyard_core::{config::AppConfig, runtime::SwitchyardRuntime};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
use commands::{
    handle_check_command, handle_config_command, handle_probe_command, handle_upload_command,
    load_config, utils::CliResult, CheckOptions, ConfigCommands, ProbeOptions, UploadOptions,
};

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Switchyard - failover API endpoint selection and image upload")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (defaults to $SWITCHYARD_CONFIG or config/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe endpoints without committing a selection
    Probe {
        /// Base URLs to probe (defaults to the configured static_base_urls)
        urls: Vec<String>,

        /// Per-probe timeout in milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Attempts per endpoint
        #[arg(short, long)]
        attempts: Option<u32>,
    },

    /// Resolve the API base URL, honoring the selection cache
    Check {
        /// Discard the cached selection and probe again
        #[arg(long)]
        force: bool,

        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload images and print markdown links
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Alt text (defaults to the file name)
        #[arg(long)]
        alt: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_logging(config: &AppConfig) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        if env_filter == "debug" {
            EnvFilter::new("warn,switchyard_core=debug,cli=debug")
        } else if env_filter == "trace" {
            EnvFilter::new("warn,switchyard_core=trace,cli=trace")
        } else {
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("warn,switchyard_core=debug,cli=debug"))
        }
    } else {
        EnvFilter::new(format!(
            "warn,switchyard_core={level},cli={level}",
            level = config.logging.level
        ))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}

async fn run(command: Commands, config_path: Option<&str>) -> CliResult<()> {
    let config = load_config(config_path)?;
    init_logging(&config);
    debug!(
        endpoints = config.api.static_base_urls.len(),
        upload_enabled = config.upload.enabled,
        "Configuration loaded"
    );

    match command {
        Commands::Probe { urls, timeout_ms, attempts } => {
            handle_probe_command(&config, ProbeOptions { urls, timeout_ms, attempts }).await
        }

        Commands::Check { force, json } => {
            let runtime = SwitchyardRuntime::builder().with_config(config).build()?;
            let result = handle_check_command(&runtime, CheckOptions { force, json }).await;
            runtime.shutdown();
            result
        }

        Commands::Upload { files, alt, json } => {
            let runtime = SwitchyardRuntime::builder().with_config(config).build()?;
            let result = handle_upload_command(&runtime, UploadOptions { files, alt, json }).await;
            runtime.shutdown();
            result
        }

        Commands::Config(config_command) => handle_config_command(config_command),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(config_command) => handle_config_command(config_command)?,
        command => run(command, cli.config.as_deref()).await?,
    }

    Ok(())
}
