// SPDX-License-Identifier: BUSL-1.1

use clap::Parser;

use sync_server::config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "sync-server", about = "Coordinates rendezvous transitions between FSM clients")]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    sync_server::run(cli.config).await
}
