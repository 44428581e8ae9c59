// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection - collector registry, inbound dispatch and request helpers
//!
//! A [`Connection`] ties the core together for one long-lived link:
//!
//! - an outbound [`Transport`] (socket writer, test channel, ...)
//! - a [`CollectorRegistry`] fed by the inbound path
//! - a [`RuntimeConfig`] supplying collector capacity and reply timeout
//!
//! Decoding bytes into packets and (re)establishing the link are left to the
//! caller: decoded packets are pushed through [`Connection::process_packet`]
//! or a channel drained by [`Connection::spawn_reader`].
//!
//! # Request/reply
//!
//! ```
//! use crossbeam::channel::unbounded;
//! use hwire::{ClientConfig, Connection, Packet};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[derive(Clone)]
//! struct Ping(String);
//!
//! impl Packet for Ping {
//!     fn packet_id(&self) -> Option<&str> {
//!         Some(&self.0)
//!     }
//! }
//!
//! // Loopback: everything sent comes straight back as inbound traffic
//! let (out_tx, out_rx) = unbounded::<Ping>();
//! let connection = Connection::<Ping>::new(Arc::new(out_tx), ClientConfig::default())?;
//! let reader = connection.spawn_reader(out_rx)?;
//!
//! let reply = connection.request_timeout(&Ping("p-1".into()), Duration::from_secs(1))?;
//! assert_eq!(reply.0, "p-1");
//!
//! connection.disconnect();
//! reader.join().expect("reader thread");
//! # Ok::<(), hwire::Error>(())
//! ```

mod reader;

use crate::collector::Collector;
use crate::config::{ClientConfig, RuntimeConfig};
use crate::error::{Error, Result};
use crate::filter::{Filter, PacketIdFilter};
use crate::packet::Packet;
use crate::registry::CollectorRegistry;
use crossbeam::channel::{Receiver, Sender};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Outbound half of a connection.
pub trait Transport<U>: Send + Sync {
    /// Encode and write one packet.
    fn send(&self, packet: &U) -> io::Result<()>;
}

/// A crossbeam sender is a transport (loopback, tests, writer threads).
impl<U: Clone + Send> Transport<U> for Sender<U> {
    fn send(&self, packet: &U) -> io::Result<()> {
        Sender::send(self, packet.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "outbound channel closed"))
    }
}

/// One persistent connection's client-side state.
pub struct Connection<U> {
    registry: Arc<CollectorRegistry<U>>,
    transport: Arc<dyn Transport<U>>,
    config: RuntimeConfig,
    connected: Arc<AtomicBool>,
    reader_started: AtomicBool,
}

impl<U: Packet> Connection<U> {
    /// Create a connected client over `transport`.
    pub fn new(transport: Arc<dyn Transport<U>>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "[Connection] created (collector_capacity={}, reply_timeout={:?})",
            config.collector_capacity,
            config.reply_timeout()
        );
        Ok(Self {
            registry: Arc::new(CollectorRegistry::new()),
            transport,
            config: RuntimeConfig::new(config),
            connected: Arc::new(AtomicBool::new(true)),
            reader_started: AtomicBool::new(false),
        })
    }

    // ===================================================================
    // State & configuration
    // ===================================================================

    /// Whether the connection is still usable
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Live configuration shared with this connection
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Default reply timeout used by [`request`](Self::request)
    pub fn reply_timeout(&self) -> Duration {
        self.config.reply_timeout()
    }

    /// Change the default reply timeout (must be non-zero)
    pub fn set_reply_timeout(&self, timeout: Duration) -> Result<()> {
        self.config.set_reply_timeout(timeout)
    }

    /// The live collector set
    pub fn registry(&self) -> &CollectorRegistry<U> {
        &self.registry
    }

    /// Close the connection: later sends fail, every collector is cancelled.
    ///
    /// Idempotent. A reader thread started with
    /// [`spawn_reader`](Self::spawn_reader) exits shortly after.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            let cancelled = self.registry.cancel_all();
            log::info!(
                "[Connection] disconnected, {} collector(s) cancelled",
                cancelled
            );
        }
    }

    // ===================================================================
    // Collectors
    // ===================================================================

    /// Register a collector retaining packets accepted by `filter`.
    pub fn create_collector<F: Filter<U> + 'static>(&self, filter: F) -> Result<Arc<Collector<U>>> {
        self.create_collector_with_capacity(filter, self.config.collector_capacity())
    }

    /// Register a collector with an explicit capacity.
    pub fn create_collector_with_capacity<F: Filter<U> + 'static>(
        &self,
        filter: F,
        capacity: usize,
    ) -> Result<Arc<Collector<U>>> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let collector = Arc::new(
            Collector::builder()
                .filter(filter)
                .capacity(capacity)
                .reply_timeout(self.config.reply_timeout())
                .build()?,
        );
        self.registry.register(Arc::clone(&collector));
        // disconnect() may have drained the registry before the insert
        if !self.is_connected() {
            self.registry.remove(&collector);
            return Err(Error::NotConnected);
        }
        Ok(collector)
    }

    /// Cancel a collector and remove it from the connection.
    pub fn remove_collector(&self, collector: &Collector<U>) {
        self.registry.remove(collector);
    }

    // ===================================================================
    // Outbound
    // ===================================================================

    /// Send a packet.
    pub fn send(&self, packet: &U) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        self.transport
            .send(packet)
            .map_err(|e| Error::SendFailed(e.to_string()))
    }

    /// Register a capacity-1 collector for replies to `packet`, then send it.
    ///
    /// The collector exists before the packet leaves, so an immediate reply
    /// cannot be missed. If the send fails the collector is removed.
    pub fn create_collector_and_send(&self, packet: &U) -> Result<Arc<Collector<U>>> {
        let filter = PacketIdFilter::for_request(packet).ok_or(Error::MissingPacketId)?;
        let collector = self.create_collector_with_capacity(filter, 1)?;

        if let Err(e) = self.send(packet) {
            self.registry.remove(&collector);
            return Err(e);
        }
        Ok(collector)
    }

    /// Send `packet` and wait for its reply with the default timeout.
    pub fn request(&self, packet: &U) -> Result<Arc<U>> {
        self.request_timeout(packet, self.reply_timeout())
    }

    /// Send `packet` and wait up to `timeout` for its reply.
    ///
    /// - `Ok(reply)`: a matching reply arrived
    /// - `Err(NoResponse)`: nothing arrived in time, or the connection closed
    /// - `Err(Remote)`: the reply carries a protocol-level error
    pub fn request_timeout(&self, packet: &U, timeout: Duration) -> Result<Arc<U>> {
        let collector = self.create_collector_and_send(packet)?;
        let reply = collector.await_or_fail(timeout);
        self.registry.remove(&collector);

        let reply = reply?;
        if let Some(err) = reply.remote_error() {
            log::debug!(
                "[Connection::request] {:?} answered with remote error: {}",
                packet.packet_id(),
                err
            );
            return Err(Error::Remote(err));
        }
        Ok(reply)
    }

    // ===================================================================
    // Inbound
    // ===================================================================

    /// Dispatch one decoded inbound packet to every live collector.
    ///
    /// Returns how many collectors retained it.
    pub fn process_packet(&self, packet: U) -> usize {
        self.process_shared(&Arc::new(packet))
    }

    /// [`process_packet`](Self::process_packet) for an already shared packet.
    pub fn process_shared(&self, packet: &Arc<U>) -> usize {
        self.registry.dispatch(packet)
    }

    /// Spawn the inbound reader thread draining `inbound` in arrival order.
    ///
    /// When every sender of `inbound` is dropped the connection is treated
    /// as lost: it is marked disconnected and all collectors are cancelled.
    ///
    /// At most one reader per connection; a second call fails with
    /// [`Error::ReaderRunning`].
    pub fn spawn_reader(&self, inbound: Receiver<U>) -> Result<JoinHandle<()>> {
        if self.reader_started.swap(true, Ordering::AcqRel) {
            return Err(Error::ReaderRunning);
        }
        match reader::spawn(
            inbound,
            Arc::clone(&self.registry),
            Arc::clone(&self.connected),
        ) {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.reader_started.store(false, Ordering::Release);
                Err(e.into())
            }
        }
    }
}

impl<U> Drop for Connection<U> {
    fn drop(&mut self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            self.registry.cancel_all();
        }
    }
}

impl<U> std::fmt::Debug for Connection<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .field("collectors", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}
