use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::mode::{OutputFormat, UpscaleMode};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpscaleRequest {
    pub mode: UpscaleMode,
    pub image: String,
    pub scale_factor: i64,
    pub creativity: i64,
    pub output_format: OutputFormat,
}

impl UpscaleRequest {
    pub fn new(image: String, scale_factor: i64, creativity: i64) -> Self {
        Self {
            mode: UpscaleMode::Crystal,
            image,
            scale_factor,
            creativity,
            output_format: OutputFormat::Png,
        }
    }
}

/// Result URL from a `{"status": 200, "message": "<url>"}` envelope.
///
/// The API may answer HTTP 200 with a different code in `status`, so the
/// embedded status is checked on its own.
pub fn result_url(envelope: &Value) -> Option<&str> {
    let status_ok = envelope
        .get("status")
        .and_then(Value::as_f64)
        .is_some_and(|status| status == 200.0);

    if !status_ok {
        return None;
    }
    envelope.get("message").and_then(Value::as_str)
}
