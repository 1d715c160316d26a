use log::{debug, error, info, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::Value;
use uuid::Uuid;
use crystal_core::{decode_rgb, encode_png, ImageBatch};
use crate::config::UpscalerConfig;
use crate::error::UpscaleError;
use crate::mode::OutputFormat;
use crate::schemas::{result_url, UploadResponse, UpscaleRequest};

const UPLOAD_FIELD: &str = "file";
const UPLOAD_FORMAT: OutputFormat = OutputFormat::Png;

/// Runs one upscale as three blocking calls: upload the input, ask the
/// Crystal API to upscale it, download the result.
///
/// Holds no per-invocation state, so one instance can serve any number of
/// callers.
pub struct Upscaler {
    config: UpscalerConfig,
    client: Client,
}

impl Upscaler {
    pub fn new(config: UpscalerConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Upscale the first image of `batch`.
    ///
    /// `scale_factor` and `creativity` are forwarded as given; range checks
    /// are left to the host widgets and the remote API.
    pub fn upscale(
        &self,
        batch: &ImageBatch,
        scale_factor: i64,
        creativity: i64,
        api_key_override: &str,
    ) -> Result<ImageBatch, UpscaleError> {
        let api_key = self.config
            .resolve_api_key(api_key_override)
            .ok_or(UpscaleError::Configuration)?;

        let image = batch
            .first()
            .ok_or_else(|| UpscaleError::InvalidInput("image batch is empty".to_string()))?;
        if batch.len() > 1 {
            debug!("Batch holds {} images, only the first is upscaled", batch.len());
        }

        let run_id = Uuid::new_v4();
        info!(
            "[{}] Upscaling {}x{} image (scale_factor={}, creativity={})",
            run_id, image.width(), image.height(), scale_factor, creativity
        );

        let png = encode_png(image).map_err(UpscaleError::Encode)?;
        debug!("[{}] Encoded input as {} PNG bytes", run_id, png.len());

        let image_url = self.upload(png)?;
        debug!("[{}] Uploaded input to {}", run_id, image_url);

        let result = self.transform(&api_key, UpscaleRequest::new(image_url, scale_factor, creativity))?;
        debug!("[{}] Crystal result at {}", run_id, result);

        let output = self.download(&result)?;
        info!(
            "[{}] Upscaled to {}x{}",
            run_id,
            output.first().map_or(0, |img| img.width()),
            output.first().map_or(0, |img| img.height())
        );

        Ok(output)
    }

    /// Post the PNG to the file host and return the public URL it assigns
    pub fn upload(&self, png: Vec<u8>) -> Result<String, UpscaleError> {
        let part = Part::bytes(png)
            .file_name(UPLOAD_FORMAT.upload_filename())
            .mime_str(UPLOAD_FORMAT.mime())
            .map_err(|e| UpscaleError::upload(None, e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.client
            .post(&self.config.endpoints.upload_url)
            .multipart(form)
            .timeout(self.config.timeouts.upload)
            .send()
            .map_err(|e| {
                error!("Upload request failed: {}", e);
                UpscaleError::upload(e.status(), e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| UpscaleError::upload(Some(status), e.to_string()))?;

        if status != StatusCode::OK {
            error!("Upload rejected with HTTP {}", status);
            return Err(UpscaleError::upload(Some(status), body));
        }

        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(data) => Ok(data.url),
            Err(_) => Err(UpscaleError::upload(Some(status), format!("response missing url: {}", body))),
        }
    }

    /// Submit `request` to the Crystal API and return the result URL
    pub fn transform(&self, api_key: &str, request: UpscaleRequest) -> Result<String, UpscaleError> {
        let response = self.client
            .post(&self.config.endpoints.transform_url)
            .bearer_auth(api_key)
            .json(&request)
            .timeout(self.config.timeouts.transform)
            .send()
            .map_err(|e| {
                error!("Crystal request failed: {}", e);
                UpscaleError::transform(e.status(), e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| UpscaleError::transform(Some(status), e.to_string()))?;

        if status != StatusCode::OK {
            error!("Crystal API rejected request with HTTP {}", status);
            return Err(UpscaleError::transform(Some(status), body));
        }

        let envelope: Value = serde_json::from_str(&body)
            .map_err(|_| UpscaleError::transform(Some(status), format!("unexpected response: {}", body)))?;

        result_url(&envelope)
            .map(str::to_string)
            .ok_or_else(|| UpscaleError::transform(Some(status), format!("unexpected response: {}", envelope)))
    }

    /// Fetch and decode the upscaled image as a single-item batch
    pub fn download(&self, url: &str) -> Result<ImageBatch, UpscaleError> {
        let to_error = |source| UpscaleError::Download { url: url.to_string(), source };

        let response = self.client
            .get(url)
            .timeout(self.config.timeouts.download)
            .send()
            .map_err(to_error)?;

        if !response.status().is_success() {
            warn!("Result download answered HTTP {}, decoding body anyway", response.status());
        }

        let bytes = response.bytes().map_err(to_error)?;
        let image = decode_rgb(&bytes).map_err(UpscaleError::Decode)?;

        Ok(ImageBatch::single(image))
    }
}
