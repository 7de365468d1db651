//! RailGuard client library: the real-time dual-channel
//! synchronization layer.
//!
//! Two independent [`channel::ReconnectingChannel`] instances feed the
//! [`telemetry::TelemetryClient`] and [`chat::ChatClient`]; each
//! client owns its state exclusively and hands immutable snapshots to
//! consumers through watch receivers. The channels share a retry
//! policy but never an ordering guarantee: their events interleave
//! arbitrarily.

pub mod channel;
pub mod chat;
pub mod config;
pub mod error;
pub mod telemetry;
