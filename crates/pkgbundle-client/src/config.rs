/*
[INPUT]:  Built-in defaults, optional YAML configuration file, PKGBUNDLE_* environment
[OUTPUT]: Validated client settings
[POS]:    Configuration layer - service address, polling cadence, submit defaults
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use pkgbundle_adapter::http::client::DEFAULT_BASE_URL;
use pkgbundle_adapter::{BundleClient, ClientConfig, SystemType};

use crate::tracker::TrackerConfig;

const ENV_PREFIX: &str = "PKGBUNDLE";

/// Top-level configuration for the bundling client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    /// Base URL of the bundling service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Interval between task status polls, also used for the task list
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay before submit is re-enabled after a task finishes
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Where archives are written; defaults to the user's download folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Use `/api/download/{id}/archive` instead of `/api/download/{id}`
    #[serde(default)]
    pub archive_suffix: bool,
    /// Form values preselected for new submissions
    #[serde(default)]
    pub defaults: SubmitDefaults,
}

/// Preselected build target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitDefaults {
    #[serde(default = "default_system_type")]
    pub system_type: SystemType,
    #[serde(default = "default_distribution")]
    pub distribution: String,
    #[serde(default = "default_arch")]
    pub arch: String,
    #[serde(default)]
    pub deep_download: bool,
}

impl Default for SubmitDefaults {
    fn default() -> Self {
        Self {
            system_type: default_system_type(),
            distribution: default_distribution(),
            arch: default_arch(),
            deep_download: false,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            cooldown_ms: default_cooldown_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            download_dir: None,
            archive_suffix: false,
            defaults: SubmitDefaults::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_cooldown_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_system_type() -> SystemType {
    SystemType::Rpm
}

fn default_distribution() -> String {
    "centos7".to_string()
}

fn default_arch() -> String {
    "auto".to_string()
}

impl ClientSettings {
    /// Load settings: defaults, then the optional YAML file, then environment overrides.
    ///
    /// Environment keys use the `PKGBUNDLE_` prefix and `__` for nesting,
    /// e.g. `PKGBUNDLE_DEFAULTS__DISTRIBUTION=ubuntu22`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                return Err(anyhow!("config file not found: {}", path.display()));
            }
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .context("read configuration sources")?
            .try_deserialize()
            .context("parse configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a YAML document, without environment overrides
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(content).context("parse YAML configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize configuration to YAML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(anyhow!("base_url cannot be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than zero"));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(anyhow!("timeouts must be greater than zero"));
        }
        if self.defaults.distribution.trim().is_empty() {
            return Err(anyhow!("defaults.distribution cannot be empty"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            poll_interval: self.poll_interval(),
            cooldown: self.cooldown(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            archive_suffix: self.archive_suffix,
        }
    }

    pub fn build_client(&self) -> Result<BundleClient> {
        BundleClient::with_config(self.client_config(), &self.base_url)
            .with_context(|| format!("create client for {}", self.base_url))
    }

    /// Download directory, falling back to `<downloads>/pkgbundle` or `./downloads`
    pub fn resolved_download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return dir.clone();
        }
        dirs::download_dir()
            .map(|dir| dir.join("pkgbundle"))
            .unwrap_or_else(|| PathBuf::from("downloads"))
    }
}
