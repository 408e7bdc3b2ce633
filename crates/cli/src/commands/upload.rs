use std::path::PathBuf;
use switchyard_core::{
    runtime::SwitchyardRuntime,
    upload::{format_file_size, FilePayload},
};

use super::utils::{print_info, print_success, CliError, CliResult};

pub struct UploadOptions {
    pub files: Vec<PathBuf>,
    pub alt: Option<String>,
    pub json: bool,
}

/// Uploads each file in turn and prints its markdown snippet.
///
/// Stops at the first failure.
pub async fn handle_upload_command(
    runtime: &SwitchyardRuntime,
    options: UploadOptions,
) -> CliResult<()> {
    let service = runtime.upload_service();
    let info = service.config_info();

    if options.files.len() > info.max_files as usize {
        return Err(CliError::Upload(format!(
            "at most {} file(s) per upload",
            info.max_files
        )));
    }

    print_info(&format!(
        "Uploading {} file(s) via {} (limit {})",
        options.files.len(),
        info.method,
        format_file_size(info.max_size)
    ));

    for path in &options.files {
        let file = FilePayload::from_path(path).await?;
        let uploaded = service.upload_image_with_alt(&file, options.alt.as_deref()).await?;

        if options.json {
            println!("{}", serde_json::to_string_pretty(&uploaded)?);
        } else {
            print_success(&format!(
                "{} -> {} ({}, {} attempt(s))",
                file.name, uploaded.outcome.url, uploaded.provider, uploaded.attempts
            ));
            println!("{}", uploaded.markdown);
        }
    }

    Ok(())
}
