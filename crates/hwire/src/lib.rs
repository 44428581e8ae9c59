// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hwire - response collectors for persistent protocol connections
//!
//! Client-side core for protocols where requests sent over one long-lived
//! connection are answered asynchronously, interleaved with unrelated
//! inbound traffic, while many callers wait for replies at the same time.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                      Request helpers (Connection)                   |
//! |   create_collector_and_send -> await_or_fail -> remote error check  |
//! +---------------------------------------------------------------------+
//! |                        CollectorRegistry                            |
//! |   register / unregister | dispatch(unit) to every live collector    |
//! +---------------------------------------------------------------------+
//! |                            Collector                                |
//! |   Filter -> bounded ring (rollover) -> poll / await_* / cancel      |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Collector`] | Filtered, bounded, cancellable buffer of inbound units |
//! | [`CollectorRegistry`] | Live collector set of one connection |
//! | [`Filter`] | Predicate deciding which units a collector keeps |
//! | [`Connection`] | Registry + transport + request/reply helpers |
//! | [`Packet`] | What the helpers need from a unit (id, remote error) |
//!
//! ## Quick Start
//!
//! ```
//! use hwire::{Collector, CollectorRegistry};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let registry = CollectorRegistry::new();
//! let odd = Arc::new(
//!     Collector::builder()
//!         .filter(|n: &u64| n % 2 == 1)
//!         .capacity(8)
//!         .build()?,
//! );
//! registry.register(Arc::clone(&odd));
//!
//! for n in 0..4u64 {
//!     registry.dispatch(&Arc::new(n));
//! }
//!
//! assert_eq!(odd.await_timeout(Duration::from_millis(10)).as_deref(), Some(&1));
//! assert_eq!(odd.poll().as_deref(), Some(&3));
//! assert!(odd.poll().is_none());
//! # Ok::<(), hwire::Error>(())
//! ```

pub mod collector;
pub mod config;
pub mod connection;
pub mod error;
pub mod filter;
pub mod packet;
pub mod registry;

pub use collector::{Collector, CollectorBuilder, CollectorId};
pub use config::{ClientConfig, RuntimeConfig};
pub use connection::{Connection, Transport};
pub use error::{Error, Result};
pub use filter::{AcceptAll, Filter, FilterExt, PacketIdFilter};
pub use packet::{ErrorCondition, ErrorKind, Packet, RemoteError};
pub use registry::CollectorRegistry;
