// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for collector and connection operations.
//!
//! Absence of a result (timeout, cancellation) is never an error at the
//! collector level; those operations return `Option`. Only construction
//! misuse, `await_or_fail` and the connection helpers produce an [`Error`].

use crate::packet::RemoteError;
use std::fmt;
use std::time::Duration;

/// Result type for hwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by collectors, the connection and configuration loading
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// Collector capacity below the minimum of 1.
    InvalidCapacity(usize),
    /// Invalid or unreadable client configuration.
    Config(String),

    // ========================================================================
    // Reply Errors
    // ========================================================================
    /// No reply arrived before the wait elapsed or the collector was cancelled.
    NoResponse {
        /// How long the caller was prepared to wait
        timeout: Duration,
    },
    /// A reply arrived but it carries a protocol-level error.
    Remote(RemoteError),

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Request packet has no id to correlate a reply with.
    MissingPacketId,
    /// The connection was closed or lost.
    NotConnected,
    /// The transport refused or failed to send a packet.
    SendFailed(String),
    /// An inbound reader is already dispatching for this connection.
    ReaderRunning,
    /// I/O error with underlying cause.
    Io(std::io::Error),
}

impl Error {
    /// Whether this error means the peer never answered.
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::NoResponse { .. })
    }

    /// The remote error carried by a reply, if that is what this is.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity(cap) => {
                write!(f, "Invalid collector capacity {} (must be >= 1)", cap)
            }
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::NoResponse { timeout } => {
                write!(f, "No response received within {}ms", timeout.as_millis())
            }
            Self::Remote(err) => write!(f, "Remote error: {}", err),
            Self::MissingPacketId => write!(f, "Request packet has no packet id"),
            Self::NotConnected => write!(f, "Not connected"),
            Self::SendFailed(msg) => write!(f, "Send failed: {}", msg),
            Self::ReaderRunning => write!(f, "Inbound reader already started"),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<RemoteError> for Error {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}
