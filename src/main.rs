use clap::Parser;
use contact_book_api::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve::run().await,
        Command::Api => cli::api::run().await,
        Command::Migrate(args) => cli::migrate::run(args).await,
    }
}
