use serde::Serialize;

/// Upscaling modes offered by the Crystal API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpscaleMode {
    #[default]
    Crystal,
}

/// Image encoding used for the uploaded input and the requested result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }

    /// Name the file host stores an upload in this format under
    pub fn upload_filename(&self) -> String {
        format!("input.{}", self.extension())
    }
}
