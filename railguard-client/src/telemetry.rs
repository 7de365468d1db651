//! Telemetry client: one reconnecting channel, last-frame-wins.
//!
//! Every inbound frame is decoded as a full [`SystemState`] and
//! replaces the published snapshot wholesale. There is no sequence
//! numbering or merging; a corrupt frame is dropped and whatever
//! arrives next supersedes it. Nothing is ever sent on this channel.

use crate::channel::{ChannelHandle, ChannelState, ReconnectingChannel};
use railguard_core::SystemState;
use railguard_protocol::decode_telemetry_frame;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub struct TelemetryClient {
    channel: ChannelHandle,
    state: watch::Receiver<SystemState>,
}

impl TelemetryClient {
    /// Open the telemetry endpoint and start republishing snapshots.
    pub fn spawn(url: String, reconnect_delay: Duration) -> Self {
        let (channel, inbound) = ReconnectingChannel::spawn(url, reconnect_delay);
        let (state_tx, state_rx) = watch::channel(SystemState::default());
        tokio::spawn(pump(inbound, state_tx));
        Self {
            channel,
            state: state_rx,
        }
    }

    /// Latest full system snapshot.
    pub fn watch_state(&self) -> watch::Receiver<SystemState> {
        self.state.clone()
    }

    pub fn channel_state(&self) -> watch::Receiver<ChannelState> {
        self.channel.state_watch()
    }

    pub fn teardown(&self) {
        self.channel.teardown();
    }
}

async fn pump(
    mut inbound: mpsc::UnboundedReceiver<String>,
    state_tx: watch::Sender<SystemState>,
) {
    while let Some(text) = inbound.recv().await {
        apply_frame(&state_tx, &text);
    }
}

/// Apply one raw frame: replace on success, drop on failure.
fn apply_frame(state_tx: &watch::Sender<SystemState>, text: &str) {
    match decode_telemetry_frame(text) {
        Ok(snapshot) => {
            tracing::debug!(
                agents = snapshot.agents.len(),
                blackboard_keys = snapshot.blackboard.len(),
                "telemetry snapshot replaced"
            );
            state_tx.send_replace(snapshot);
        }
        Err(err) => {
            tracing::warn!(error = %err, "dropping malformed telemetry frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railguard_core::AgentStatus;

    fn frame(agents: &str) -> String {
        format!(r#"{{"blackboard":{{}},"agents":{},"health":{{}}}}"#, agents)
    }

    #[test]
    fn malformed_frame_leaves_previous_state_unchanged() {
        let (tx, rx) = watch::channel(SystemState::default());
        apply_frame(&tx, &frame(r#"[{"id":"A1","status":"active"}]"#));
        let before = rx.borrow().clone();
        assert_eq!(before.agents.len(), 1);

        apply_frame(&tx, "{ not json");
        apply_frame(&tx, r#"{"agents":[{"id":"A999","status":"active"}]}"#);
        assert_eq!(*rx.borrow(), before);
    }

    #[test]
    fn second_valid_frame_replaces_the_first_wholesale() {
        let (tx, rx) = watch::channel(SystemState::default());
        apply_frame(
            &tx,
            r#"{"blackboard":{"RAW_SENSOR":{"fps":30}},"agents":[{"id":"A1","status":"active"}],"health":{}}"#,
        );
        apply_frame(&tx, &frame(r#"[{"id":"A2","status":"warning"}]"#));

        let state = rx.borrow().clone();
        // Nothing from the first frame survives.
        assert!(state.blackboard.is_empty());
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.agents[0].id.number(), 2);
        assert_eq!(state.agents[0].status, AgentStatus::Warning);
    }
}
