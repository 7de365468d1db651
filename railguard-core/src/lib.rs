//! RailGuard Core - Domain Types
//!
//! Pure data structures shared by the protocol and client crates:
//! the fixed 50-agent catalog, telemetry state snapshots, and the
//! conversation transcript. No I/O lives here.

pub mod catalog;
pub mod chat;
pub mod error;
pub mod state;

pub use catalog::{AgentCatalog, AgentCategory, AgentDescriptor, AgentId};
pub use chat::{AgentRef, ChatMessage, ConversationState, Phase, Sender};
pub use error::CatalogError;
pub use state::{AgentStatus, AgentStatusEntry, SystemState};
