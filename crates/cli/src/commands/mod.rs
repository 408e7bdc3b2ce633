pub mod check;
pub mod config;
pub mod probe;
pub mod upload;
pub mod utils;

pub use check::{handle_check_command, CheckOptions};
pub use config::{handle_config_command, ConfigCommands};
pub use probe::{handle_probe_command, ProbeOptions};
pub use upload::{handle_upload_command, UploadOptions};

use switchyard_core::config::AppConfig;
use utils::{CliError, CliResult};

/// Loads `file` when given, otherwise the default location.
pub fn load_config(file: Option<&str>) -> CliResult<AppConfig> {
    match file {
        Some(file) => AppConfig::from_file(file),
        None => AppConfig::load(),
    }
    .map_err(|e| CliError::Config(e.to_string()))
}
