use clap::Parser;
use grounded_rag::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Query(args) => cli::query::run(args).await,
        Command::Hydrate(args) => cli::hydrate::run(args).await,
    }
}
