use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "https://learn2ux-backend.vercel.app/api/";

/// Runtime configuration.
///
/// Sources, lowest priority first: built-in defaults, an optional
/// `learn2ux.toml` in the working directory, then `LEARN2UX_*` environment
/// variables (a `.env` file is loaded into the environment beforehand).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub bind_address: String,
    pub static_dir: PathBuf,
    /// Enables `Secure` on the session cookie.
    pub production: bool,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("static_dir", "static")?
            .set_default("production", false)?
            .add_source(File::with_name("learn2ux").required(false))
            .add_source(Environment::with_prefix("LEARN2UX").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn with_api_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            bind_address: "0.0.0.0:8080".to_owned(),
            static_dir: PathBuf::from("static"),
            production: false,
            request_timeout_secs: None,
        }
    }
}
