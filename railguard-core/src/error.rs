//! Error types for RailGuard core operations.

use thiserror::Error;

/// Catalog lookup errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The id does not name one of the 50 registered agents.
    #[error("Unknown agent id: {id}")]
    UnknownAgent { id: String },
}
