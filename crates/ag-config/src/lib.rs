//! # ag-config
//!
//! Layered configuration for the Agora client:
//! built-in defaults, then an optional TOML file, then `AGORA_*` environment
//! variables (a `.env` file is loaded into the environment first).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";
pub const DEFAULT_CONFIG_FILE: &str = "agora.toml";
pub const DEFAULT_SESSION_FILE: &str = ".agora/session.json";
const DEFAULT_TIMEOUT_SECS: i64 = 15;
const ENV_PREFIX: &str = "AGORA";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the forum API, without a trailing slash.
    pub api_url: String,
    /// Where the signed-in session is persisted between runs.
    pub session_file: PathBuf,
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
    pub user_agent: String,
}

impl AppConfig {
    /// Loads `.env`, then `file` (or the file named by `AGORA_CONFIG`, or
    /// `agora.toml`), then the environment.
    pub fn load(file: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let file = file
            .or_else(|| std::env::var_os("AGORA_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(Some(&file))
    }

    /// Same as [`AppConfig::load`] without touching `.env`. A missing file is not an error.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("session_file", DEFAULT_SESSION_FILE)?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("log_format", "pretty")?
            .set_default(
                "user_agent",
                concat!("agora-client/", env!("CARGO_PKG_VERSION")),
            )?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        let cfg = cfg.validated()?;
        info!(api_url = %cfg.api_url, "configuration loaded");
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_string();
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must be an http(s) URL, got {:?}",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.session_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("session_file must not be empty".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let cfg = AppConfig::load_from(Some(Path::new("does-not-exist.toml"))).unwrap();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
api_url = "https://forum.example.com/api/v1/"
request_timeout_secs = 5
log_format = "json"
"#,
        );
        let cfg = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(cfg.api_url, "https://forum.example.com/api/v1");
        assert_eq!(cfg.request_timeout_secs, 5);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let file = write_config("request_timeout_secs = 0\n");
        let err = AppConfig::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let file = write_config("api_url = \"ftp://forum.example.com\"\n");
        assert!(matches!(
            AppConfig::load_from(Some(file.path())),
            Err(ConfigError::Invalid(_))
        ));
    }
}
