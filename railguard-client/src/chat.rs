//! Chat client: the conversational request/response protocol.
//!
//! A single task owns the [`ConversationState`] and applies inbound
//! frames and consumer commands strictly in arrival order, so a phase
//! transition from frame N is visible before frame N+1 is processed.
//! Consumers only ever see cloned snapshots through the watch
//! receiver.

use crate::channel::{ChannelHandle, ChannelState, ReconnectingChannel};
use railguard_core::{AgentCatalog, AgentRef, ConversationState, Phase};
use railguard_protocol::{decode_chat_frame, ChatRequest, ChatServerFrame};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

enum ChatCommand {
    Submit(String),
    Reset,
}

pub struct ChatClient {
    channel: ChannelHandle,
    commands: mpsc::UnboundedSender<ChatCommand>,
    conversation: watch::Receiver<ConversationState>,
}

impl ChatClient {
    /// Open the conversational endpoint.
    pub fn spawn(url: String, reconnect_delay: Duration) -> Self {
        let (channel, inbound) = ReconnectingChannel::spawn(url, reconnect_delay);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (conversation_tx, conversation_rx) = watch::channel(ConversationState::new());
        tokio::spawn(pump(channel.clone(), inbound, command_rx, conversation_tx));
        Self {
            channel,
            commands: command_tx,
            conversation: conversation_rx,
        }
    }

    /// Submit a query. A no-op when the trimmed query is empty or the
    /// channel is not open; callers gate input on channel state, so a
    /// drop here is expected, not an error.
    pub fn submit(&self, query: impl Into<String>) {
        let _ = self.commands.send(ChatCommand::Submit(query.into()));
    }

    /// Restore the initial conversation locally. Does not talk to the
    /// server and leaves channel connectivity untouched.
    pub fn reset(&self) {
        let _ = self.commands.send(ChatCommand::Reset);
    }

    /// Latest conversation snapshot.
    pub fn watch_conversation(&self) -> watch::Receiver<ConversationState> {
        self.conversation.clone()
    }

    pub fn channel_state(&self) -> watch::Receiver<ChannelState> {
        self.channel.state_watch()
    }

    pub fn teardown(&self) {
        self.channel.teardown();
    }
}

async fn pump(
    channel: ChannelHandle,
    mut inbound: mpsc::UnboundedReceiver<String>,
    mut commands: mpsc::UnboundedReceiver<ChatCommand>,
    conversation_tx: watch::Sender<ConversationState>,
) {
    let mut conversation = ConversationState::new();
    loop {
        tokio::select! {
            frame = inbound.recv() => match frame {
                Some(text) => match decode_chat_frame(&text) {
                    Ok(frame) => {
                        apply_server_frame(&mut conversation, frame);
                        conversation_tx.send_replace(conversation.clone());
                    }
                    Err(err) => {
                        // Unknown frame kinds land here too; ignoring
                        // them keeps the protocol extensible.
                        tracing::warn!(error = %err, "dropping unrecognized chat frame");
                    }
                },
                None => break,
            },
            command = commands.recv() => match command {
                Some(ChatCommand::Submit(query)) => {
                    if let Some(request) = prepare_submit(&mut conversation, &query, channel.is_open()) {
                        match serde_json::to_string(&request) {
                            Ok(payload) => channel.send(payload),
                            Err(err) => tracing::warn!(error = %err, "failed to encode chat request"),
                        }
                        conversation_tx.send_replace(conversation.clone());
                    }
                }
                Some(ChatCommand::Reset) => {
                    conversation.reset();
                    conversation_tx.send_replace(conversation.clone());
                }
                None => break,
            }
        }
    }
}

/// Gate and record a submission. Returns the frame to send, or `None`
/// when the query is blank after trimming or the channel is not open.
pub fn prepare_submit(
    conversation: &mut ConversationState,
    query: &str,
    channel_open: bool,
) -> Option<ChatRequest> {
    if query.trim().is_empty() || !channel_open {
        return None;
    }
    conversation.push_user(query);
    conversation.phase = Phase::AwaitingResponse;
    Some(ChatRequest {
        query: query.to_string(),
    })
}

/// Apply one decoded server frame to the conversation.
pub fn apply_server_frame(conversation: &mut ConversationState, frame: ChatServerFrame) {
    match frame {
        ChatServerFrame::Thinking { active_agents } => {
            // The only place the active set changes mid-turn. Also
            // idempotent when the phase is already AwaitingResponse.
            conversation.phase = Phase::AwaitingResponse;
            conversation.active_agents = active_agents.into_iter().collect();
        }
        ChatServerFrame::Response {
            response,
            active_agents,
            confidence,
        } => {
            let agents = active_agents.map(resolve_annotations);
            conversation.push_system(response, agents, confidence);
            conversation.phase = Phase::Idle;
            // active_agents is deliberately left as the last known
            // engaged set until the next thinking frame.
        }
    }
}

/// Fill in display names from the catalog where the server omitted
/// them. Unknown ids are kept verbatim; annotations are best-effort
/// display metadata, not validated input.
fn resolve_annotations(refs: Vec<AgentRef>) -> Vec<AgentRef> {
    let catalog = AgentCatalog::global();
    refs.into_iter()
        .map(|r| {
            if r.name.is_empty() {
                if let Ok(descriptor) = catalog.lookup(&r.id) {
                    return AgentRef {
                        id: r.id,
                        name: descriptor.name.to_string(),
                    };
                }
            }
            r
        })
        .collect()
}
