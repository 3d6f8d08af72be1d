use std::time::Duration;

use serde::Deserialize;

use crate::domain::context_cache::{CacheScope, ProviderKind};
use crate::infrastructure::logging::LoggingConfig;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::vertex::{VertexClientConfig, DEFAULT_MAX_LIST_PAGES};

/// Prefix of environment overrides, e.g. `CONTEXT_CACHE__REMOTE__PROJECT`
pub const ENV_PREFIX: &str = "CONTEXT_CACHE";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub remote: RemoteSettings,
}

/// Local cache and coordinator settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub safety_margin_secs: u64,
    pub default_ttl_secs: u64,
    /// Background sweep period; `0` disables the sweeper
    pub sweep_interval_secs: u64,
    pub serialize_creations: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            safety_margin_secs: 5,
            default_ttl_secs: 3600,
            sweep_interval_secs: 0,
            serialize_creations: true,
        }
    }
}

impl CacheSettings {
    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

/// Remote cached-contents API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub provider: ProviderKind,
    pub project: Option<String>,
    pub location: Option<String>,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
    pub max_list_pages: usize,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::VertexAi,
            project: None,
            location: None,
            api_base: None,
            api_key: None,
            access_token: None,
            timeout_secs: 60,
            max_list_pages: DEFAULT_MAX_LIST_PAGES,
        }
    }
}

impl RemoteSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn scope(&self) -> CacheScope {
        CacheScope::new(self.provider, self.project.clone(), self.location.clone())
    }

    pub fn client_config(&self) -> VertexClientConfig {
        let mut config = VertexClientConfig::new().with_max_list_pages(self.max_list_pages);
        config.api_base = self.api_base.clone();
        config.api_key = self.api_key.clone();
        config.access_token = self.access_token.clone();
        config
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(environment())
    }

    fn load_with(env: config::Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(env)
            .build()?;

        config.try_deserialize()
    }
}
