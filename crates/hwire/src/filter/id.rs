// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Correlation filter matching packets by id.

use super::Filter;
use crate::packet::Packet;

/// Accepts packets whose [`Packet::packet_id`] equals a given id.
///
/// Used by the request helpers to pick the reply to one request out of the
/// inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIdFilter {
    id: String,
}

impl PacketIdFilter {
    /// Match packets carrying `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Match replies to `request`, or `None` if the request has no id
    pub fn for_request<P: Packet>(request: &P) -> Option<Self> {
        request.packet_id().map(Self::new)
    }

    /// The id being matched
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<P: Packet> Filter<P> for PacketIdFilter {
    #[inline]
    fn accept(&self, packet: &P) -> bool {
        packet.packet_id() == Some(self.id.as_str())
    }
}
