// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collector - filtered, bounded buffer of inbound packets
//!
//! A collector receives every inbound unit offered by the dispatch path,
//! keeps those its filter accepts, and hands them out to consumers in
//! arrival order.
//!
//! # Architecture
//!
//! - One `parking_lot::Mutex` guards the ring buffer, the cancelled flag and
//!   the rollover counter, so append, drain and cancel never interleave.
//! - One `Condvar` wakes blocked consumers: `notify_one` per retained unit,
//!   `notify_all` on cancel.
//! - The filter runs outside the lock; the cancelled flag is re-checked
//!   under the lock before appending.
//!
//! # Waiting disciplines
//!
//! | Method | Blocks | Empty result when |
//! |--------|--------|-------------------|
//! | [`Collector::poll`] | never | buffer empty or cancelled |
//! | [`Collector::await_timeout`] | up to the duration | timeout or cancel |
//! | [`Collector::await_forever`] | until data | cancel |
//! | [`Collector::await_or_fail`] | up to the duration | `Err(NoResponse)` |
//!
//! # Example
//!
//! ```
//! use hwire::Collector;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let collector = Collector::<u32>::new(None, 2)?;
//! for n in 0..3 {
//!     collector.ingest(&Arc::new(n));
//! }
//!
//! // Capacity 2: unit 0 rolled over
//! assert_eq!(collector.poll().as_deref(), Some(&1));
//! assert_eq!(collector.await_timeout(Duration::from_millis(10)).as_deref(), Some(&2));
//! assert!(collector.poll().is_none());
//! # Ok::<(), hwire::Error>(())
//! ```

mod ring;

use crate::config::{DEFAULT_COLLECTOR_CAPACITY, DEFAULT_REPLY_TIMEOUT, MIN_COLLECTOR_CAPACITY};
use crate::error::{Error, Result};
use crate::filter::{AcceptAll, Filter};
use parking_lot::{Condvar, Mutex};
use ring::RingBuffer;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Process-unique collector identity, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectorId(u64);

impl CollectorId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CollectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collector-{}", self.0)
    }
}

/// State mutated by the dispatch path, consumers and `cancel`.
struct State<U> {
    buffer: RingBuffer<Arc<U>>,
    cancelled: bool,
    evicted: u64,
}

/// Filtered, bounded, cancellable buffer of inbound units.
///
/// Share it as `Arc<Collector<U>>` between the dispatch path (via a
/// [`CollectorRegistry`](crate::CollectorRegistry)) and any number of
/// consumer threads.
pub struct Collector<U> {
    id: CollectorId,
    filter: Arc<dyn Filter<U>>,
    reply_timeout: Duration,
    state: Mutex<State<U>>,
    available: Condvar,
    /// Mirror of `State::cancelled` for lock-free reads
    cancelled: AtomicBool,
}

impl<U> Collector<U> {
    /// Create a collector.
    ///
    /// `filter = None` accepts every unit. Fails with
    /// [`Error::InvalidCapacity`] if `capacity < 1`.
    pub fn new(filter: Option<Arc<dyn Filter<U>>>, capacity: usize) -> Result<Self> {
        Self::with_parts(filter, capacity, DEFAULT_REPLY_TIMEOUT)
    }

    /// Start building a collector with non-default settings.
    pub fn builder() -> CollectorBuilder<U> {
        CollectorBuilder::new()
    }

    fn with_parts(
        filter: Option<Arc<dyn Filter<U>>>,
        capacity: usize,
        reply_timeout: Duration,
    ) -> Result<Self> {
        if capacity < MIN_COLLECTOR_CAPACITY {
            return Err(Error::InvalidCapacity(capacity));
        }

        let filter = filter.unwrap_or_else(|| Arc::new(AcceptAll) as Arc<dyn Filter<U>>);

        Ok(Self {
            id: CollectorId::next(),
            filter,
            reply_timeout,
            state: Mutex::new(State {
                buffer: RingBuffer::with_capacity(capacity),
                cancelled: false,
                evicted: 0,
            }),
            available: Condvar::new(),
            cancelled: AtomicBool::new(false),
        })
    }

    /// Offer an inbound unit (called by the dispatch path).
    ///
    /// Returns `true` if the unit was retained. No-op when cancelled or when
    /// the filter rejects the unit. A full buffer drops its oldest entry.
    pub fn ingest(&self, unit: &Arc<U>) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return false;
        }
        if !self.filter.accept(unit) {
            return false;
        }

        let mut state = self.state.lock();
        // cancel() may have run while the filter was evaluated
        if state.cancelled {
            return false;
        }
        if state.buffer.push_overwrite(Arc::clone(unit)).is_some() {
            state.evicted += 1;
            log::trace!(
                "[Collector::ingest] {} full (cap={}), oldest unit rolled over",
                self.id,
                state.buffer.capacity()
            );
        }
        drop(state);

        self.available.notify_one();
        true
    }

    /// Take the oldest buffered unit without blocking.
    pub fn poll(&self) -> Option<Arc<U>> {
        let mut state = self.state.lock();
        if state.cancelled {
            return None;
        }
        state.buffer.pop()
    }

    /// Block until a unit is available or the collector is cancelled.
    pub fn await_forever(&self) -> Option<Arc<U>> {
        let mut state = self.state.lock();
        loop {
            if state.cancelled {
                return None;
            }
            if let Some(unit) = state.buffer.pop() {
                return Some(unit);
            }
            self.available.wait(&mut state);
        }
    }

    /// Block up to `timeout` for a unit.
    ///
    /// Returns `None` once the full duration has elapsed without data, or as
    /// soon as the collector is cancelled.
    pub fn await_timeout(&self, timeout: Duration) -> Option<Arc<U>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.await_forever();
        };

        let mut state = self.state.lock();
        loop {
            if state.cancelled {
                return None;
            }
            if let Some(unit) = state.buffer.pop() {
                return Some(unit);
            }
            if self
                .available
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                if state.cancelled {
                    return None;
                }
                return state.buffer.pop();
            }
        }
    }

    /// [`await_timeout`](Self::await_timeout) with this collector's reply timeout.
    pub fn await_next(&self) -> Option<Arc<U>> {
        self.await_timeout(self.reply_timeout)
    }

    /// Like [`await_timeout`](Self::await_timeout), but an empty result
    /// becomes [`Error::NoResponse`].
    pub fn await_or_fail(&self, timeout: Duration) -> Result<Arc<U>> {
        self.await_timeout(timeout)
            .ok_or(Error::NoResponse { timeout })
    }

    /// [`await_or_fail`](Self::await_or_fail) with this collector's reply timeout.
    pub fn await_reply(&self) -> Result<Arc<U>> {
        self.await_or_fail(self.reply_timeout)
    }

    /// Cancel the collector.
    ///
    /// Idempotent. Wakes every blocked waiter (they return `None`), discards
    /// buffered units, and turns all later calls into no-ops.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if state.cancelled {
            return;
        }
        state.cancelled = true;
        self.cancelled.store(true, Ordering::Release);
        let dropped = state.buffer.len();
        state.buffer.clear();
        drop(state);

        self.available.notify_all();
        log::debug!(
            "[Collector::cancel] {} cancelled, {} buffered unit(s) dropped",
            self.id,
            dropped
        );
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Collector identity
    #[inline]
    pub fn id(&self) -> CollectorId {
        self.id
    }

    /// Filter deciding which units are retained
    pub fn filter(&self) -> &Arc<dyn Filter<U>> {
        &self.filter
    }

    /// Maximum number of buffered units
    pub fn capacity(&self) -> usize {
        self.state.lock().buffer.capacity()
    }

    /// Number of currently buffered units
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// True if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    /// Number of units dropped by rollover since creation
    pub fn evicted_count(&self) -> u64 {
        self.state.lock().evicted
    }

    /// Default wait used by [`await_next`](Self::await_next) and
    /// [`await_reply`](Self::await_reply)
    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }
}

impl<U> fmt::Debug for Collector<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Collector")
            .field("id", &self.id)
            .field("capacity", &state.buffer.capacity())
            .field("len", &state.buffer.len())
            .field("cancelled", &state.cancelled)
            .field("evicted", &state.evicted)
            .finish()
    }
}

/// Builder for [`Collector`].
///
/// # Example
///
/// ```
/// use hwire::Collector;
/// use std::time::Duration;
///
/// let collector = Collector::<String>::builder()
///     .filter(|s: &String| s.starts_with("presence"))
///     .capacity(16)
///     .reply_timeout(Duration::from_secs(2))
///     .build()?;
/// assert_eq!(collector.capacity(), 16);
/// # Ok::<(), hwire::Error>(())
/// ```
pub struct CollectorBuilder<U> {
    filter: Option<Arc<dyn Filter<U>>>,
    capacity: usize,
    reply_timeout: Duration,
}

impl<U> CollectorBuilder<U> {
    fn new() -> Self {
        Self {
            filter: None,
            capacity: DEFAULT_COLLECTOR_CAPACITY,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Retain only units accepted by `filter`
    #[must_use]
    pub fn filter<F: Filter<U> + 'static>(mut self, filter: F) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Retain only units accepted by an already shared filter
    #[must_use]
    pub fn shared_filter(mut self, filter: Arc<dyn Filter<U>>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Buffer capacity (default: [`DEFAULT_COLLECTOR_CAPACITY`])
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Default reply wait (default: [`DEFAULT_REPLY_TIMEOUT`])
    #[must_use]
    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Validate and create the collector
    pub fn build(self) -> Result<Collector<U>> {
        Collector::with_parts(self.filter, self.capacity, self.reply_timeout)
    }
}

impl<U> Default for CollectorBuilder<U> {
    fn default() -> Self {
        Self::new()
    }
}
