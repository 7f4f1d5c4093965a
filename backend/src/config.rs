use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// YAML list of events loaded at startup.
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Marketplace API base url; the syncer is disabled when unset.
    pub base_url: Option<String>,
    pub list_path: String,
    pub interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            list_path: "/event/list".to_string(),
            interval_secs: 300,
            request_timeout_secs: 15,
        }
    }
}

impl UpstreamConfig {
    pub fn is_enabled(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|base| !base.trim().is_empty())
    }

    pub fn list_url(&self) -> anyhow::Result<Url> {
        let base = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .ok_or_else(|| anyhow!("upstream base url not configured"))?;
        let mut url = Url::parse(base).with_context(|| format!("invalid upstream url: {base}"))?;
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            self.list_path.trim_start_matches('/')
        );
        url.set_path(&path);
        Ok(url)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "logs/event-dedupe.log".to_string(),
            level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let explicit_path = std::env::var("CONFIG_FILE").ok();
        let config = if let Some(path) = explicit_path {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("config file {:?} not found", path));
            }
            Self::load_from_file(&path)?
        } else {
            let path = locate_default_config();
            if let Some(path) = path {
                Self::load_from_file(&path)?
            } else {
                AppConfig::default()
            }
        };

        Self::apply_env_overrides(config)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        Self::from_yaml(&contents).with_context(|| format!("failed to parse config file {:?}", path))
    }

    fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        if contents.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    fn apply_env_overrides(mut config: AppConfig) -> anyhow::Result<AppConfig> {
        if let Ok(bind) = std::env::var("SERVER_BIND") {
            config.server.bind = bind;
        }

        if let Ok(seed) = std::env::var("EVENTS_SEED_FILE") {
            config.catalog.seed_file = Some(seed);
        }

        if let Ok(base_url) = std::env::var("UPSTREAM_BASE_URL") {
            config.upstream.base_url = Some(base_url);
        }

        if let Ok(list_path) = std::env::var("UPSTREAM_LIST_PATH") {
            config.upstream.list_path = list_path;
        }

        if let Some(interval) = parse_optional_env("UPSTREAM_SYNC_INTERVAL_SECS")? {
            config.upstream.interval_secs = interval;
        }

        if let Some(timeout) = parse_optional_env("UPSTREAM_TIMEOUT_SECS")? {
            config.upstream.request_timeout_secs = timeout;
        }

        if let Ok(log_file) = std::env::var("LOG_FILE_PATH") {
            config.logging.file = log_file;
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.logging.level = Some(log_level);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.is_enabled() {
            self.upstream
                .list_url()
                .context("UPSTREAM_BASE_URL or upstream.base_url is not a valid url")?;
        }
        Ok(())
    }
}

fn parse_optional_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(Some(
            v.parse::<T>()
                .with_context(|| format!("{key} must be a valid value"))?,
        )),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn locate_default_config() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("config/config.yaml"),
        PathBuf::from("../config/config.yaml"),
    ];

    candidates.into_iter().find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = AppConfig::from_yaml("server:\n  bind: 0.0.0.0:9000\n").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.upstream.list_path, "/event/list");
        assert_eq!(config.upstream.interval_secs, 300);
        assert!(config.catalog.seed_file.is_none());
        assert_eq!(config.logging.level.as_deref(), Some("info"));
    }

    #[test]
    fn empty_file_is_default_config() {
        let config = AppConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(!config.upstream.is_enabled());
    }

    #[test]
    fn list_url_joins_base_path() {
        let upstream = UpstreamConfig {
            base_url: Some("https://api.example.com/v1/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            upstream.list_url().unwrap().as_str(),
            "https://api.example.com/v1/event/list"
        );

        let upstream = UpstreamConfig {
            base_url: Some("http://localhost:4000".to_string()),
            list_path: "events".to_string(),
            ..Default::default()
        };
        assert_eq!(
            upstream.list_url().unwrap().as_str(),
            "http://localhost:4000/events"
        );
    }

    #[test]
    fn blank_base_url_disables_upstream() {
        let upstream = UpstreamConfig {
            base_url: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!upstream.is_enabled());
        assert!(upstream.list_url().is_err());
    }

    #[test]
    fn invalid_base_url_fails_validation() {
        let config = AppConfig {
            upstream: UpstreamConfig {
                base_url: Some("not a url".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
