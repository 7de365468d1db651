//! Conversation transcript types.
//!
//! The transcript is append-only: insertion order is display order is
//! causal order, and messages are never mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Text of the synthetic message every conversation starts with.
pub const WELCOME_TEXT: &str = "Welcome, Engineer. RailGuard concierge online: \
50 specialized agents at your service.\n\nWhat scenario would you like to analyze?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

/// Id-and-name pair annotating which agents contributed to a reply.
///
/// The id is kept as raw text: annotations are display metadata, so an
/// id the catalog does not know is shown verbatim instead of dropping
/// the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Monotonic within one conversation, unique across resets of the
    /// same instance only by restarting from 1.
    pub id: u64,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<AgentRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Phase of the current conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

/// Complete conversation snapshot owned by the chat client. Handed to
/// consumers as a cloned value, never serialized on a wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    pub transcript: Vec<ChatMessage>,
    pub phase: Phase,
    /// Last known engaged agent ids. Left in place after a response
    /// until the next thinking frame overwrites it.
    pub active_agents: BTreeSet<String>,
    next_message_id: u64,
}

impl ConversationState {
    /// New conversation holding only the synthetic welcome message.
    pub fn new() -> Self {
        let welcome = ChatMessage {
            id: 1,
            sender: Sender::System,
            timestamp: Utc::now(),
            text: WELCOME_TEXT.to_string(),
            agents: None,
            confidence: None,
        };
        Self {
            transcript: vec![welcome],
            phase: Phase::Idle,
            active_agents: BTreeSet::new(),
            next_message_id: 2,
        }
    }

    /// Atomically restore the initial value: one welcome message,
    /// Idle, no active agents.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(Sender::User, text.into(), None, None)
    }

    pub fn push_system(
        &mut self,
        text: impl Into<String>,
        agents: Option<Vec<AgentRef>>,
        confidence: Option<f64>,
    ) -> &ChatMessage {
        self.push(Sender::System, text.into(), agents, confidence)
    }

    fn push(
        &mut self,
        sender: Sender,
        text: String,
        agents: Option<Vec<AgentRef>>,
        confidence: Option<f64>,
    ) -> &ChatMessage {
        let message = ChatMessage {
            id: self.next_message_id,
            sender,
            timestamp: Utc::now(),
            text,
            agents,
            confidence,
        };
        self.next_message_id += 1;
        self.transcript.push(message);
        self.transcript
            .last()
            .unwrap_or_else(|| unreachable!("transcript is never empty after a push"))
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_conversation_holds_only_the_welcome_message() {
        let conversation = ConversationState::new();
        assert_eq!(conversation.transcript.len(), 1);
        assert_eq!(conversation.transcript[0].sender, Sender::System);
        assert_eq!(conversation.transcript[0].text, WELCOME_TEXT);
        assert_eq!(conversation.phase, Phase::Idle);
        assert!(conversation.active_agents.is_empty());
    }

    #[test]
    fn message_ids_are_monotonic_and_appended_in_order() {
        let mut conversation = ConversationState::new();
        conversation.push_user("status?");
        conversation.push_system("all nominal", None, Some(0.99));
        conversation.push_user("anything else?");
        let ids: Vec<u64> = conversation.transcript.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn reset_restores_the_initial_value() {
        let mut conversation = ConversationState::new();
        conversation.push_user("hello");
        conversation.phase = Phase::AwaitingResponse;
        conversation.active_agents.insert("A3".to_string());
        conversation.reset();
        assert_eq!(conversation.transcript.len(), 1);
        assert_eq!(conversation.phase, Phase::Idle);
        assert!(conversation.active_agents.is_empty());
        // Message ids restart as well, matching a brand-new instance.
        assert_eq!(conversation.push_user("again").id, 2);
    }
}
