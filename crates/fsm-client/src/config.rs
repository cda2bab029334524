// SPDX-License-Identifier: BUSL-1.1

use std::path::PathBuf;

use clap::Parser;

/// `<automaton_file> <prefix> [--server-url URL] [--dump]` — unchanged CLI
/// shape from §6, with `--server-url`/`--auth-token`/`--dump` as ambient
/// additions grounded in the teacher's `coop` CLI (`clap::Parser` with
/// `env`-backed flags).
#[derive(Debug, Parser)]
#[command(name = "fsm-client", about = "Drives a parsed automaton against a sync-server")]
pub struct Cli {
    /// Path to the `.aut` automaton file.
    pub automaton_file: PathBuf,

    /// Prefix this process registers its alphabet under.
    pub prefix: String,

    /// Base URL of the sync-server, e.g. http://127.0.0.1:7800.
    #[arg(long, default_value = "http://127.0.0.1:7800", env = "SYNC_SERVER_URL")]
    pub server_url: String,

    /// Bearer token to present if the server requires one.
    #[arg(long, env = "SYNC_SERVER_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Print the parsed automaton (states, transitions, interned alphabet)
    /// and exit without contacting the server — the supplemented equivalent
    /// of the original's unconditional `fsm_print` dump.
    #[arg(long)]
    pub dump: bool,
}
