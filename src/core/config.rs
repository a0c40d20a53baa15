use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_FEED_URL: &str = "https://www.amfiindia.com/spages/NAVAll.txt";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AmfiProviderConfig {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AmfiProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AmfiProviderConfig {
    fn default() -> Self {
        AmfiProviderConfig {
            feed_url: default_feed_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub amfi: AmfiProviderConfig,
}

/// Header names of the holdings file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnsConfig {
    pub scheme_name: String,
    pub nav: String,
    pub date: String,
    pub amount: String,
    pub current_nav: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        ColumnsConfig {
            scheme_name: "SchemeName".to_string(),
            nav: "NAV".to_string(),
            date: "Date".to_string(),
            amount: "Amount".to_string(),
            current_nav: "CurrentNAV".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it has not been created yet.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "mfnav", "mfnav")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
