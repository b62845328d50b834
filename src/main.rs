use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stale_branch_notifier::{Args, Config, run};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stale_branch_notifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_args(args)?;
    tracing::debug!(?config, "Loaded configuration");

    run(&config).await?;
    Ok(())
}
