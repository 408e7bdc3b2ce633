use bytes::Bytes;
use serde::Serialize;
use std::path::Path;

/// A file to upload, fully buffered.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    pub data: Bytes,
}

impl FilePayload {
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { name: name.into(), content_type: content_type.into(), data: data.into() }
    }

    /// Reads `path`, guessing the content type from its extension.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type_for(&name).to_string();
        Ok(Self::new(name, content_type, data))
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Text after the last `.`, or the whole name when there is none.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or_default()
    }
}

/// MIME type for common image extensions; `application/octet-stream` otherwise.
#[must_use]
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// What a provider reports after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub success: bool,
    pub url: String,
    pub file_name: String,
    pub original_name: String,
    pub size: u64,
}

impl UploadOutcome {
    #[must_use]
    pub fn stored_as(url: impl Into<String>, file_name: impl Into<String>, file: &FilePayload) -> Self {
        Self {
            success: true,
            url: url.into(),
            file_name: file_name.into(),
            original_name: file.name.clone(),
            size: file.size(),
        }
    }

    /// Outcome for hosts that keep the original file name.
    #[must_use]
    pub fn hosted(url: impl Into<String>, file: &FilePayload) -> Self {
        Self::stored_as(url, file.name.clone(), file)
    }
}

/// A finished upload as returned by [`UploadService`](super::UploadService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    #[serde(flatten)]
    pub outcome: UploadOutcome,
    /// `![alt](url)`
    pub markdown: String,
    /// Provider that accepted the file.
    pub provider: String,
    pub attempts: usize,
}

/// Snapshot reported by [`UploadService::config_info`](super::UploadService::config_info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadConfigInfo {
    pub enabled: bool,
    pub method: String,
    pub max_files: u32,
    pub max_size: u64,
    pub config_valid: bool,
}
