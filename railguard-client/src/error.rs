//! Error types for the client binary.
//!
//! Transport failures never appear here: disconnection is absorbed by
//! the reconnect loop and malformed frames are dropped at receipt, so
//! the only hard failures are bootstrap ones.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
