//! Telemetry state snapshots.
//!
//! A [`SystemState`] is the whole-value payload of one telemetry
//! frame: it is replaced wholesale on every frame and never
//! field-merged, so no identity survives a replacement except by
//! reappearing in the new payload.

use crate::catalog::AgentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reported status of one agent in a telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Warning,
    Critical,
    Idle,
    Running,
}

/// One currently-reporting agent. The feed is not required to cover
/// all 50 agents in every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatusEntry {
    pub id: AgentId,
    #[serde(default)]
    pub name: String,
    pub status: AgentStatus,
}

/// Full system snapshot pushed by the telemetry endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// Shared blackboard contents, keyed by layer/section name.
    #[serde(default)]
    pub blackboard: Map<String, Value>,
    /// Currently-reporting agents, in feed order.
    #[serde(default)]
    pub agents: Vec<AgentStatusEntry>,
    /// Per-component health records, keyed by component id.
    #[serde(default)]
    pub health: Map<String, Value>,
}

impl SystemState {
    /// True for the state the dashboard starts from, before the first
    /// telemetry frame lands.
    pub fn is_empty(&self) -> bool {
        self.blackboard.is_empty() && self.agents.is_empty() && self.health.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_wire_form() {
        assert_eq!(
            serde_json::to_string(&AgentStatus::Critical).unwrap(),
            "\"critical\""
        );
        let status: AgentStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, AgentStatus::Running);
    }

    #[test]
    fn entry_tolerates_missing_name() {
        let entry: AgentStatusEntry =
            serde_json::from_str(r#"{"id":"A7","status":"idle"}"#).unwrap();
        assert_eq!(entry.id.number(), 7);
        assert_eq!(entry.name, "");
        assert_eq!(entry.status, AgentStatus::Idle);
    }

    #[test]
    fn default_state_is_empty() {
        let state = SystemState::default();
        assert!(state.is_empty());
        assert!(state.agents.is_empty());
    }
}
