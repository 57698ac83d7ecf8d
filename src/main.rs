use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    promptharvest::logging::init().context("init logging")?;

    let cli = promptharvest::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        promptharvest::cli::Command::Run(args) => {
            promptharvest::pipeline::run(args).await.context("run")?;
        }
        promptharvest::cli::Command::Fetch(args) => {
            promptharvest::fetch::run(args).await.context("fetch")?;
        }
        promptharvest::cli::Command::Extract(args) => {
            promptharvest::extract::run(args).context("extract")?;
        }
        promptharvest::cli::Command::Organize(args) => {
            promptharvest::organize::run(args).context("organize")?;
        }
    }

    Ok(())
}
