use std::env::vars;
use std::time::Duration;

use log::info;
use serde::Deserialize;
use ustr::Ustr;

/// Where the directory service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
}

const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment overrides, read through `serde-env`.
///
/// - `DIRECTORY_API_URL`: service origin, without the `/api` suffix
/// - `DIRECTORY_REQUEST_TIMEOUT_SECS`: per-request timeout
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    directory_api_url: Option<String>,
    directory_request_timeout_secs: Option<u64>,
}

impl DirectoryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Base of every directory endpoint, e.g. `http://localhost:4000/api`.
    pub fn api_url(&self) -> Ustr {
        let base = self.api_base_url.trim_end_matches('/');
        Ustr::from(&format!("{base}/api"))
    }

    /// Build the configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        info!("Loading directory configuration from environment variables");
        let raw: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            directory_api_url,
            directory_request_timeout_secs,
        } = raw;

        let api_base_url = match directory_api_url {
            Some(url) if url.trim().is_empty() => {
                anyhow::bail!("DIRECTORY_API_URL is set but empty")
            }
            Some(url) => {
                info!("Using provided DIRECTORY_API_URL: {url}");
                url.trim().to_owned()
            }
            None => {
                info!("DIRECTORY_API_URL not set, defaulting to {DEFAULT_API_BASE_URL}");
                DEFAULT_API_BASE_URL.to_owned()
            }
        };

        let request_timeout = match directory_request_timeout_secs {
            Some(0) => anyhow::bail!("DIRECTORY_REQUEST_TIMEOUT_SECS must be greater than 0"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            api_base_url,
            request_timeout,
        })
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_env::from_iter;

    fn from_pairs(pairs: Vec<(&str, &str)>) -> anyhow::Result<DirectoryConfig> {
        let raw: RawConfig = from_iter(pairs)?;
        DirectoryConfig::from_raw(raw)
    }

    #[test]
    fn default_points_at_local_service() {
        let config = DirectoryConfig::default();

        assert_eq!(config.api_base_url, "http://localhost:4000");
        assert_eq!(config.api_url(), Ustr::from("http://localhost:4000/api"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn api_url_tolerates_trailing_slash() {
        let config = DirectoryConfig::new("https://directory.example.com/");

        assert_eq!(
            config.api_url(),
            Ustr::from("https://directory.example.com/api")
        );
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = from_pairs(vec![
            ("DIRECTORY_API_URL", "https://directory.example.com"),
            ("DIRECTORY_REQUEST_TIMEOUT_SECS", "5"),
        ])
        .expect("config should build");

        assert_eq!(config.api_base_url, "https://directory.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_env_falls_back_to_defaults() {
        let config = from_pairs(vec![("UNRELATED", "1")]).expect("config should build");

        assert_eq!(config, DirectoryConfig::default());
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(from_pairs(vec![("DIRECTORY_API_URL", " ")]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(from_pairs(vec![("DIRECTORY_REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }
}
