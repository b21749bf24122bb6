use clap::Parser;
use hybrid_rag::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::bootstrap()?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => cli::chat::run(config).await,
        Command::Ask { query } => cli::chat::ask(config, &query.join(" ")).await,
    }
}
