// SPDX-License-Identifier: BUSL-1.1

use clap::Parser;

use fsm_client::config::Cli;
use fsm_client::driver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.dump {
        return driver::dump(&cli.automaton_file).await;
    }

    driver::run(&cli.automaton_file, &cli.prefix, &cli.server_url, cli.auth_token).await
}
