//! Application configuration

mod app_config;

pub use app_config::{AppConfig, CacheSettings, RemoteSettings};
pub use crate::infrastructure::logging::{LogFormat, LoggingConfig};
