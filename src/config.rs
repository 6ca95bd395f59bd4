//! Layered runtime settings.
//!
//! Settings resolve in three layers, highest precedence first:
//! 1. command-line flags and their environment variables ([`GlobalArgs`])
//! 2. an optional YAML file named by `--config`
//! 3. built-in defaults
//!
//! ```yaml
//! endpoint: http://localhost:8000/api/news
//! page_size: 50
//! timeout_secs: 30
//! ```

use crate::cli::GlobalArgs;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/news";
/// Items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid endpoint `{endpoint}`: {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Contents of the optional YAML config file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub endpoint: Option<String>,
    pub page_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl FileSettings {
    pub fn from_yaml(path: &str, text: &str) -> Result<Self, ConfigError> {
        // An empty file parses as YAML null.
        let parsed: Option<FileSettings> =
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?;
        Ok(parsed.unwrap_or_default())
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Url,
    pub page_size: usize,
    pub timeout: Duration,
}

impl Settings {
    /// Resolve settings from flags, reading the config file if one was named.
    #[instrument(level = "info", skip_all, fields(config = ?args.config))]
    pub async fn load(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .await
                    .map_err(|source| ConfigError::Read {
                        path: path.clone(),
                        source,
                    })?;
                info!(%path, "Loaded config file");
                FileSettings::from_yaml(path, &text)?
            }
            None => FileSettings::default(),
        };
        Self::layered(args, file)
    }

    /// Merge flags over file values over defaults, then validate.
    pub fn layered(args: &GlobalArgs, file: FileSettings) -> Result<Self, ConfigError> {
        let endpoint = args
            .endpoint
            .clone()
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let page_size = args
            .page_size
            .or(file.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let timeout_secs = args
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        if page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".into()));
        }

        let mut url = Url::parse(&endpoint).map_err(|source| ConfigError::Endpoint {
            endpoint: endpoint.clone(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "endpoint `{endpoint}` must use http or https"
            )));
        }
        // `/api/news/` and `/api/news` name the same resource.
        let trimmed = url.path().trim_end_matches('/').to_string();
        if !trimmed.is_empty() {
            url.set_path(&trimmed);
        }

        let settings = Settings {
            endpoint: url,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
        };
        debug!(?settings, "Resolved settings");
        Ok(settings)
    }
}
