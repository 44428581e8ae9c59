// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collector registry - the live set of collectors of one connection
//!
//! Routes each inbound unit to every registered collector, in registration
//! order. A dispatch pass holds the membership read lock for its whole
//! duration, so once [`CollectorRegistry::unregister`] returns no pass can
//! deliver to the removed collector. Concurrent passes only share the read
//! lock.
//!
//! Filters run inside the pass and must not call back into the registry.

use crate::collector::{Collector, CollectorId};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Connection-scoped set of live collectors.
pub struct CollectorRegistry<U> {
    collectors: RwLock<BTreeMap<CollectorId, Arc<Collector<U>>>>,
}

impl<U> CollectorRegistry<U> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            collectors: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add a collector; it receives every unit dispatched from now on.
    pub fn register(&self, collector: Arc<Collector<U>>) -> CollectorId {
        let id = collector.id();
        let total = {
            let mut collectors = self.collectors.write();
            collectors.insert(id, collector);
            collectors.len()
        };
        log::debug!("[CollectorRegistry] registered {} (live={})", id, total);
        id
    }

    /// Remove a collector. It is not cancelled; see [`Self::remove`].
    pub fn unregister(&self, id: CollectorId) -> Option<Arc<Collector<U>>> {
        let removed = self.collectors.write().remove(&id);
        if removed.is_some() {
            log::debug!("[CollectorRegistry] unregistered {}", id);
        }
        removed
    }

    /// Cancel and remove a collector.
    pub fn remove(&self, collector: &Collector<U>) {
        collector.cancel();
        self.unregister(collector.id());
    }

    /// Offer `unit` to every live collector.
    ///
    /// Returns how many collectors retained it. Cancelled collectors seen
    /// during the pass are pruned afterwards.
    pub fn dispatch(&self, unit: &Arc<U>) -> usize {
        let mut retained = 0;
        let mut stale = Vec::new();
        {
            let collectors = self.collectors.read();
            for (id, collector) in collectors.iter() {
                if collector.is_cancelled() {
                    stale.push(*id);
                } else if collector.ingest(unit) {
                    retained += 1;
                }
            }
        }

        if !stale.is_empty() {
            let mut collectors = self.collectors.write();
            for id in &stale {
                collectors.remove(id);
            }
            log::trace!(
                "[CollectorRegistry::dispatch] pruned {} cancelled collector(s)",
                stale.len()
            );
        }

        retained
    }

    /// Cancel and remove every collector (connection closed or lost).
    pub fn cancel_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.collectors.write());
        for collector in drained.values() {
            collector.cancel();
        }
        if !drained.is_empty() {
            log::debug!(
                "[CollectorRegistry] cancelled {} collector(s)",
                drained.len()
            );
        }
        drained.len()
    }

    /// Whether `id` is currently registered
    pub fn contains(&self, id: CollectorId) -> bool {
        self.collectors.read().contains_key(&id)
    }

    /// Number of registered collectors
    pub fn len(&self) -> usize {
        self.collectors.read().len()
    }

    /// True if no collector is registered
    pub fn is_empty(&self) -> bool {
        self.collectors.read().is_empty()
    }
}

impl<U> Default for CollectorRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> std::fmt::Debug for CollectorRegistry<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("live", &self.len())
            .finish()
    }
}
