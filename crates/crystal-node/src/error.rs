use reqwest::StatusCode;
use thiserror::Error;
use crate::config::API_KEY_ENV;

#[derive(Error, Debug)]
pub enum UpscaleError {
    #[error("Missing API key: supply api_key_override or set {}", API_KEY_ENV)]
    Configuration,

    #[error("Invalid input image: {0}")]
    InvalidInput(String),

    #[error("Failed to encode input as PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Upload failed: {}", describe(.status, .body))]
    Upload {
        status: Option<StatusCode>,
        body: String,
    },

    #[error("Crystal API error: {}", describe(.status, .body))]
    Transform {
        status: Option<StatusCode>,
        body: String,
    },

    #[error("Failed to download result from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode result image: {0}")]
    Decode(#[source] image::ImageError),
}

impl UpscaleError {
    /// HTTP status of the failing remote call, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upload { status, .. } | Self::Transform { status, .. } => *status,
            Self::Download { source, .. } => source.status(),
            _ => None,
        }
    }

    pub(crate) fn upload(status: Option<StatusCode>, body: impl Into<String>) -> Self {
        Self::Upload { status, body: body.into() }
    }

    pub(crate) fn transform(status: Option<StatusCode>, body: impl Into<String>) -> Self {
        Self::Transform { status, body: body.into() }
    }
}

fn describe(status: &Option<StatusCode>, body: &str) -> String {
    match status {
        Some(status) => format!("HTTP {}: {}", status, body),
        None => body.to_string(),
    }
}
