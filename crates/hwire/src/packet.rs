// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet trait and protocol-level error types.
//!
//! Collectors and the registry treat units as opaque. The connection layer
//! and its request helpers need two things from a packet: an id to correlate
//! a reply with its request, and whether a reply reports a remote error.

use std::fmt;

/// A decoded protocol unit exchanged over the connection.
///
/// # Example
///
/// ```
/// use hwire::{Packet, RemoteError};
///
/// struct Iq {
///     id: String,
///     error: Option<RemoteError>,
/// }
///
/// impl Packet for Iq {
///     fn packet_id(&self) -> Option<&str> {
///         Some(&self.id)
///     }
///
///     fn remote_error(&self) -> Option<RemoteError> {
///         self.error.clone()
///     }
/// }
/// ```
pub trait Packet: Send + Sync + 'static {
    /// Correlation id. Replies carry the id of the request they answer.
    fn packet_id(&self) -> Option<&str>;

    /// Protocol-level error carried by this packet, if any.
    fn remote_error(&self) -> Option<RemoteError> {
        None
    }
}

/// How the requester is expected to react to a remote error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Retry after providing credentials
    Auth,
    /// Do not retry (unrecoverable)
    Cancel,
    /// Proceed (the condition was only a warning)
    Continue,
    /// Retry after changing the data sent
    Modify,
    /// Retry after waiting (temporary error)
    Wait,
}

impl ErrorKind {
    /// Wire name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Cancel => "cancel",
            Self::Continue => "continue",
            Self::Modify => "modify",
            Self::Wait => "wait",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auth" => Some(Self::Auth),
            "cancel" => Some(Self::Cancel),
            "continue" => Some(Self::Continue),
            "modify" => Some(Self::Modify),
            "wait" => Some(Self::Wait),
            _ => None,
        }
    }
}

/// Defined error conditions a remote entity can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCondition {
    /// Malformed or unprocessable request
    BadRequest,
    /// Resource or session conflict
    Conflict,
    /// Feature not implemented by the recipient
    FeatureNotImplemented,
    /// Requester lacks permissions
    Forbidden,
    /// Addressed item does not exist
    ItemNotFound,
    /// Action not allowed by the recipient's policy
    NotAllowed,
    /// Requester must authenticate first
    NotAuthorized,
    /// Service temporarily or permanently unavailable
    ServiceUnavailable,
    /// Recipient hit an internal failure
    InternalServerError,
    /// Remote server did not answer in time
    RemoteServerTimeout,
    /// Condition not covered by the other variants
    #[default]
    UndefinedCondition,
}

impl ErrorCondition {
    /// Default kind associated with this condition
    pub fn default_kind(self) -> ErrorKind {
        match self {
            Self::BadRequest | Self::NotAllowed => ErrorKind::Modify,
            Self::Conflict
            | Self::FeatureNotImplemented
            | Self::ItemNotFound
            | Self::ServiceUnavailable
            | Self::UndefinedCondition => ErrorKind::Cancel,
            Self::Forbidden | Self::NotAuthorized => ErrorKind::Auth,
            Self::InternalServerError | Self::RemoteServerTimeout => ErrorKind::Wait,
        }
    }

    /// Wire name of the condition
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad-request",
            Self::Conflict => "conflict",
            Self::FeatureNotImplemented => "feature-not-implemented",
            Self::Forbidden => "forbidden",
            Self::ItemNotFound => "item-not-found",
            Self::NotAllowed => "not-allowed",
            Self::NotAuthorized => "not-authorized",
            Self::ServiceUnavailable => "service-unavailable",
            Self::InternalServerError => "internal-server-error",
            Self::RemoteServerTimeout => "remote-server-timeout",
            Self::UndefinedCondition => "undefined-condition",
        }
    }

    /// Parse a wire name; unknown names map to `UndefinedCondition`
    pub fn from_name(name: &str) -> Self {
        match name {
            "bad-request" => Self::BadRequest,
            "conflict" => Self::Conflict,
            "feature-not-implemented" => Self::FeatureNotImplemented,
            "forbidden" => Self::Forbidden,
            "item-not-found" => Self::ItemNotFound,
            "not-allowed" => Self::NotAllowed,
            "not-authorized" => Self::NotAuthorized,
            "service-unavailable" => Self::ServiceUnavailable,
            "internal-server-error" => Self::InternalServerError,
            "remote-server-timeout" => Self::RemoteServerTimeout,
            _ => Self::UndefinedCondition,
        }
    }
}

/// Error reported by the remote entity inside a reply packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    kind: ErrorKind,
    condition: ErrorCondition,
    text: Option<String>,
}

impl RemoteError {
    /// Create an error with the condition's default kind
    pub fn new(condition: ErrorCondition) -> Self {
        Self {
            kind: condition.default_kind(),
            condition,
            text: None,
        }
    }

    /// Create an error with an explicit kind
    pub fn with_kind(condition: ErrorCondition, kind: ErrorKind) -> Self {
        Self {
            kind,
            condition,
            text: None,
        }
    }

    /// Attach a human-readable description
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Reaction kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error condition
    pub fn condition(&self) -> ErrorCondition {
        self.condition
    }

    /// Optional description supplied by the remote entity
    pub fn description(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.condition.as_str(), self.kind.as_str())?;
        if let Some(text) = &self.text {
            write!(f, " - {}", text)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}
