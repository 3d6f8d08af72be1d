//! Resolve command - resolves request files to cached-content handles

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{bootstrap, ScopeArgs};
use crate::domain::{Resolution, ResolveInput};
use crate::infrastructure::context_cache::spawn_sweeper;
use crate::infrastructure::observability::{record_local_cache, shutdown_tracing};

/// Arguments for the resolve command
#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    /// JSON request files (model, messages, tools, cached_content, ttl)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Resolve every file this many times; later rounds hit the local cache
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,

    /// Print local cache statistics after resolving
    #[arg(long)]
    pub stats: bool,
}

#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    input: &'a Path,
    round: u32,
    resolution: &'a Resolution,
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> anyhow::Result<()> {
    let mut config = bootstrap();
    args.scope.apply(&mut config);

    let scope = config.remote.scope();
    let cache = crate::create_local_cache(&config);
    let service = crate::create_context_cache_service(&config, cache.clone());
    let client = crate::create_remote_client(&config)?;

    let sweeper = config
        .cache
        .sweep_interval()
        .map(|interval| spawn_sweeper(cache.clone(), interval));

    let mut requests = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        requests.push((path.as_path(), read_input(path).await?));
    }

    for round in 1..=args.repeat.max(1) {
        for (path, input) in &requests {
            let resolution = service
                .resolve(input.clone(), &scope, &client)
                .await
                .with_context(|| format!("Failed to resolve {}", path.display()))?;

            let output = ResolveOutput {
                input: path,
                round,
                resolution: &resolution,
            };
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    let stats = service.stats()?;
    record_local_cache(&stats);
    info!(
        entries = stats.total_entries,
        valid = stats.valid_entries,
        "Resolve run complete"
    );

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }

    shutdown_tracing();
    Ok(())
}

async fn read_input(path: &Path) -> anyhow::Result<ResolveInput> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("Invalid request in {}", path.display()))
}
