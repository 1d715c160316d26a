use std::env;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

pub const API_KEY_ENV: &str = "CRYSTAL_API_KEY";

pub const UPLOAD_URL: &str = "https://ace.genfrontai.com:3000/put_crystal";
pub const TRANSFORM_URL: &str = "https://api-upscale.clarityai.co";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub upload_url: String,
    pub transform_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            upload_url: UPLOAD_URL.to_string(),
            transform_url: TRANSFORM_URL.to_string(),
        }
    }
}

/// Per-call bounds on each network round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub upload: Duration,
    pub transform: Duration,
    pub download: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            upload: Duration::from_secs(60),
            transform: Duration::from_secs(120),
            download: Duration::from_secs(120),
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct UpscalerConfig {
    /// Fallback credential used when an invocation carries no override
    pub api_key: Option<String>,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
}

impl UpscalerConfig {
    /// Read configuration from the process environment.
    ///
    /// When `CRYSTAL_API_KEY` is not set, a `.env` file in the working
    /// directory or one of its parents is consulted. The file is only read;
    /// nothing is written back into the process environment.
    pub fn from_env() -> Self {
        let file = match dotenvy::dotenv_iter() {
            Ok(iter) => Some(iter),
            Err(e) if e.not_found() => None,
            Err(e) => {
                log::warn!("Ignoring unreadable .env file: {}", e);
                None
            }
        };
        Self::from_sources(file)
    }

    /// Same as [`UpscalerConfig::from_env`] with an explicit env file
    pub fn from_env_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = match dotenvy::from_path_iter(path) {
            Ok(iter) => Some(iter),
            Err(e) => {
                log::warn!("Ignoring unreadable env file {}: {}", path.display(), e);
                None
            }
        };
        Self::from_sources(file)
    }

    fn from_sources<R: Read>(file: Option<dotenvy::Iter<R>>) -> Self {
        let api_key = env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| file.and_then(api_key_from_file));

        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Pick the credential for one invocation: the trimmed override wins,
    /// then the configured key.
    ///
    /// Both sources are trimmed and a whitespace-only key counts as absent.
    /// This deliberately departs from forwarding the environment value
    /// verbatim: a padded key would only fail later at the transform call.
    pub fn resolve_api_key(&self, api_key_override: &str) -> Option<String> {
        let key = api_key_override.trim();
        if !key.is_empty() {
            return Some(key.to_string());
        }

        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

fn api_key_from_file<R: Read>(iter: dotenvy::Iter<R>) -> Option<String> {
    let (_, key) = iter
        .filter_map(Result::ok)
        .find(|(name, _)| name == API_KEY_ENV)?;
    log::debug!("Using {} from env file", API_KEY_ENV);
    Some(key).filter(|key| !key.trim().is_empty())
}

impl std::fmt::Debug for UpscalerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpscalerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoints", &self.endpoints)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}
