//! Wire frames for the two RailGuard WebSocket protocols.
//!
//! Both endpoints exchange JSON text frames. The telemetry endpoint
//! (`/ws/updates`) is server-to-client only and its payload is a full
//! [`SystemState`]; the conversational endpoint (`/ws/chat`) is
//! bidirectional with server frames discriminated by a `type` field.
//!
//! Frames that fail to decode are dropped by the receiving client, so
//! adding new `type` values on the server is backward compatible.

use railguard_core::{AgentRef, SystemState};
use serde::{Deserialize, Serialize};

/// The only client-originated chat frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

/// Server-originated chat frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatServerFrame {
    /// The turn is in progress; `active_agents` names the engaged ids.
    Thinking { active_agents: Vec<String> },
    /// The turn's final answer.
    Response {
        response: String,
        #[serde(default)]
        active_agents: Option<Vec<AgentRef>>,
        #[serde(default)]
        confidence: Option<f64>,
    },
}

/// Decode one telemetry frame. The payload is the whole system state.
pub fn decode_telemetry_frame(text: &str) -> Result<SystemState, serde_json::Error> {
    serde_json::from_str(text)
}

/// Decode one server chat frame.
pub fn decode_chat_frame(text: &str) -> Result<ChatServerFrame, serde_json::Error> {
    serde_json::from_str(text)
}
