// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while putting a record on the wire.
///
/// These never leave the crate's public entry points: the transport logs and drops them.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to resolve console host {0}: {1}")]
    Resolve(String, #[source] std::io::Error),

    #[error("Console host {0} resolved to no address")]
    NoAddress(String),

    #[error("Failed to open datagram socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Failed to send datagram: {0}")]
    Send(#[source] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur when building an agent configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
