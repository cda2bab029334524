// SPDX-License-Identifier: BUSL-1.1

//! The GFSP runtime loop: register, publish initial sensitivities, then
//! translate each notification into a state change and a fresh publish.

use std::path::Path;

use futures_util::StreamExt;
use tokio::signal::unix::{signal, SignalKind};
use tokio_tungstenite::tungstenite::Message;

use sync_protocol::Notification;

use crate::automaton;
use crate::client::ServerClient;
use crate::model::FsmModel;

pub async fn dump(automaton_file: &Path) -> anyhow::Result<()> {
    let model = load_model(automaton_file)?;
    println!("states: {}", model.nr_states());
    println!("alphabet ({} actions, first-seen order):", model.alphabet().len());
    for (local_index, action) in model.alphabet().iter().enumerate() {
        println!("  [{local_index}] {action}");
    }
    Ok(())
}

fn load_model(automaton_file: &Path) -> anyhow::Result<FsmModel> {
    let text = std::fs::read_to_string(automaton_file)?;
    let parsed = automaton::parse(&text)?;
    Ok(FsmModel::from_automaton(&parsed))
}

fn notify_url(server_url: &str, process_id: &str, auth_token: Option<&str>) -> String {
    let ws_base = server_url.replacen("http", "ws", 1);
    match auth_token {
        Some(token) => format!("{ws_base}/ws/{process_id}/notify?token={token}"),
        None => format!("{ws_base}/ws/{process_id}/notify"),
    }
}

/// Waits for any of SIGINT/SIGTERM/SIGQUIT/SIGHUP — §4.2.4's shutdown set.
async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!("received SIGINT"),
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sigquit.recv() => tracing::info!("received SIGQUIT"),
        _ = sighup.recv() => tracing::info!("received SIGHUP"),
    }
    Ok(())
}

pub async fn run(
    automaton_file: &Path,
    prefix: &str,
    server_url: &str,
    auth_token: Option<String>,
) -> anyhow::Result<()> {
    let model = load_model(automaton_file)?;
    let client = ServerClient::new(server_url, auth_token);

    let registration = client.register_with_retry(prefix, model.alphabet()).await?;
    let process_id = registration.process_id;
    tracing::info!(
        process_id = %process_id,
        nr_actions = registration.indices.len(),
        "alphabet registered"
    );

    let url = notify_url(client.base_url(), &process_id, client.auth_token());
    let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
    let (_write, mut read) = ws_stream.split();

    let mut current_state = 0usize;
    client
        .update_sensitivities(&process_id, &model.sensitivities_for_state(current_state))
        .await?;
    tracing::debug!(current_state, "initial sensitivities published");

    loop {
        tokio::select! {
            shutdown = wait_for_shutdown_signal() => {
                shutdown?;
                break;
            }
            message = read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        let notification: Notification = serde_json::from_str(&text)?;
                        current_state = apply_notification(
                            &model,
                            &registration.indices,
                            current_state,
                            notification,
                        );
                        client
                            .update_sensitivities(&process_id, &model.sensitivities_for_state(current_state))
                            .await?;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::warn!("notification socket closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(%err, "notification socket error");
                        break;
                    }
                }
            }
        }
    }

    client.delete(&process_id).await?;
    tracing::info!("deleted, exiting");
    Ok(())
}

/// Translates a global transition index back to a local action index by
/// scanning `alphabet_transitions`, then applies the first-wins rule.
fn apply_notification(
    model: &FsmModel,
    alphabet_transitions: &[u64],
    current_state: usize,
    notification: Notification,
) -> usize {
    let Some(local_index) =
        alphabet_transitions.iter().position(|&global| global == notification.transition_index)
    else {
        tracing::warn!(
            transition_index = notification.transition_index,
            "notified of a transition outside this process's alphabet"
        );
        return current_state;
    };

    match model.change_state(current_state, local_index) {
        Some(next_state) => {
            tracing::info!(current_state, next_state, local_index, "transition fired");
            next_state
        }
        None => {
            tracing::warn!(
                current_state,
                local_index,
                "no outgoing transition for notified action in current state"
            );
            current_state
        }
    }
}
