//! CLI module for PMP Context Cache
//!
//! Provides subcommands for working with remote cached content:
//! - `resolve`: resolve request files to cached-content handles
//! - `list`: list cached contents visible in a scope

pub mod list;
pub mod resolve;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::context_cache::{CacheScope, ProviderKind};
use crate::infrastructure::observability::init_tracing;

/// PMP Context Cache - reuse remote cached content for LLM prompts
#[derive(Parser)]
#[command(name = "pmp-context-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve request files against the local and remote cache
    Resolve(resolve::ResolveArgs),

    /// List cached contents in a scope
    List(list::ListArgs),
}

/// Scope overrides shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct ScopeArgs {
    /// Remote provider: gemini, vertex_ai or vertex_ai_beta (overrides config)
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Vertex project (overrides config)
    #[arg(long)]
    pub project: Option<String>,

    /// Vertex location (overrides config)
    #[arg(long)]
    pub location: Option<String>,
}

impl ScopeArgs {
    /// Apply overrides on top of the configured remote scope
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(provider) = self.provider {
            config.remote.provider = provider;
        }
        if let Some(project) = &self.project {
            config.remote.project = Some(project.clone());
        }
        if let Some(location) = &self.location {
            config.remote.location = Some(location.clone());
        }
    }

    pub fn scope(&self, config: &AppConfig) -> CacheScope {
        let mut config = config.clone();
        self.apply(&mut config);
        config.remote.scope()
    }
}

/// Load `.env` and configuration, then start logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    init_tracing(&config.logging, &config.observability.tracing);

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve_command() {
        let cli = Cli::try_parse_from([
            "pmp-context-cache",
            "resolve",
            "request.json",
            "--provider",
            "vertex_ai_beta",
            "--project",
            "project-1",
            "--location",
            "us-central1",
            "--repeat",
            "3",
        ])
        .unwrap();

        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve command");
        };
        assert_eq!(args.inputs.len(), 1);
        assert_eq!(args.repeat, 3);

        let scope = args.scope.scope(&AppConfig::default());
        assert_eq!(scope.provider, ProviderKind::VertexAiBeta);
        assert_eq!(scope.namespace(), Some(("project-1", "us-central1")));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = Cli::try_parse_from(["pmp-context-cache", "list", "--provider", "bedrock"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_scope_args_keep_config_values() {
        let mut config = AppConfig::default();
        config.remote.project = Some("configured".to_string());
        config.remote.location = Some("global".to_string());

        let args = ScopeArgs {
            location: Some("europe-west4".to_string()),
            ..Default::default()
        };

        let scope = args.scope(&config);
        assert_eq!(scope.namespace(), Some(("configured", "europe-west4")));
    }
}
