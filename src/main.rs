use clap::Parser;
use pmp_context_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve(args) => cli::resolve::run(args).await,
        Command::List(args) => cli::list::run(args).await,
    }
}
