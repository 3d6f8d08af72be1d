//! List command - prints cached contents visible in a scope

use clap::Args;
use tracing::info;

use super::{bootstrap, ScopeArgs};
use crate::domain::RemoteCacheClient;
use crate::infrastructure::observability::shutdown_tracing;

/// Arguments for the list command
#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Only show the entry with this display name
    #[arg(long)]
    pub label: Option<String>,
}

/// Run the list command
pub async fn run(args: ListArgs) -> anyhow::Result<()> {
    let mut config = bootstrap();
    args.scope.apply(&mut config);

    let scope = config.remote.scope();
    let client = crate::create_remote_client(&config)?;

    let contents = match &args.label {
        Some(label) => client.find_by_label(label, &scope).await?.into_iter().collect(),
        None => client.list(&scope).await?,
    };

    info!(provider = %scope.provider, count = contents.len(), "Listed cached contents");
    println!("{}", serde_json::to_string_pretty(&contents)?);

    shutdown_tracing();
    Ok(())
}
