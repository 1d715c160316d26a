pub mod config;
pub mod error;
pub mod mode;
pub mod node;
pub mod schemas;
pub mod upscaler;

pub use config::{Endpoints, Timeouts, UpscalerConfig, API_KEY_ENV};
pub use error::UpscaleError;
pub use node::{registry, registry_with, CrystalUpscaler};
pub use upscaler::Upscaler;
