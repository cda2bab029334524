// SPDX-License-Identifier: BUSL-1.1

/// Configuration for the synchronisation server.
#[derive(Debug, Clone, clap::Args)]
pub struct ServerConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "SYNC_SERVER_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 7800, env = "SYNC_SERVER_PORT")]
    pub port: u16,

    /// Bearer token required on every non-health route. If unset, auth is disabled.
    #[arg(long, env = "SYNC_SERVER_AUTH_TOKEN")]
    pub auth_token: Option<String>,
}
