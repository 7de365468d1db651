//! RailGuard client entry point.
//!
//! Wires the two clients together and logs every state transition
//! until a shutdown signal arrives. All rendering sits on top of the
//! watch receivers tapped here.

use railguard_client::chat::ChatClient;
use railguard_client::config::ClientConfig;
use railguard_client::error::ClientError;
use railguard_client::telemetry::TelemetryClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::load()?;
    let delay = config.reconnect_delay();

    let telemetry = TelemetryClient::spawn(config.updates_url.clone(), delay);
    let chat = ChatClient::spawn(config.chat_url.clone(), delay);

    let mut system = telemetry.watch_state();
    let mut conversation = chat.watch_conversation();
    let mut updates_link = telemetry.channel_state();
    let mut chat_link = chat.channel_state();

    tracing::info!(
        updates = %config.updates_url,
        chat = %config.chat_url,
        "railguard client started"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
            changed = system.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = system.borrow_and_update().clone();
                tracing::info!(
                    agents = snapshot.agents.len(),
                    blackboard_keys = snapshot.blackboard.len(),
                    health_keys = snapshot.health.len(),
                    "system state replaced"
                );
            }
            changed = conversation.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = conversation.borrow_and_update().clone();
                tracing::info!(
                    messages = snapshot.transcript.len(),
                    phase = ?snapshot.phase,
                    active_agents = snapshot.active_agents.len(),
                    "conversation updated"
                );
            }
            changed = updates_link.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *updates_link.borrow_and_update();
                tracing::info!(%state, "telemetry link");
            }
            changed = chat_link.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *chat_link.borrow_and_update();
                tracing::info!(%state, "chat link");
            }
        }
    }

    telemetry.teardown();
    chat.teardown();
    Ok(())
}
