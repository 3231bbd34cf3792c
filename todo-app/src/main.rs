use anyhow::Context;
use clap::Parser;
use todo_app::cli::Cli;
use todo_app::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let config = Config::from_env().context("cannot load configuration")?;

    let mut stdout = std::io::stdout().lock();
    todo_app::cli::run(args, config, &mut stdout).await
}
