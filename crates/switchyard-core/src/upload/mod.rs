//! Image upload with multi-provider failover.

pub mod errors;
pub mod providers;
pub mod service;
pub mod types;

pub use errors::UploadError;
pub use providers::{
    build_image_bed, build_image_beds, CustomProvider, EnvelopeProvider, EnvelopeFormat,
    RankedProvider, UploadProvider, WebDavProvider,
};
pub use service::{format_file_size, markdown_image, UploadService};
pub use types::{content_type_for, FilePayload, UploadConfigInfo, UploadOutcome, UploadedImage};
