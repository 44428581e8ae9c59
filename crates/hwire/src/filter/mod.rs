// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet filters - predicates deciding which units a collector retains
//!
//! A filter is evaluated once per inbound unit for every live collector, from
//! the dispatch thread, possibly concurrently when one filter instance is
//! shared. Filters with mutable state must synchronize it themselves.
//!
//! # Example
//!
//! ```
//! use hwire::filter::{AcceptAll, Filter, FilterExt};
//!
//! let even = |n: &u32| n % 2 == 0;
//! let small = |n: &u32| *n < 10;
//! let filter = even.and(small);
//!
//! assert!(filter.accept(&4));
//! assert!(!filter.accept(&12));
//! assert!(AcceptAll.accept(&12));
//! ```

mod combinators;
mod id;

pub use combinators::{AndFilter, NotFilter, OrFilter};
pub use id::PacketIdFilter;

use std::sync::Arc;

/// Boolean test over an inbound unit.
pub trait Filter<U: ?Sized>: Send + Sync {
    /// Returns `true` if `unit` should be retained.
    fn accept(&self, unit: &U) -> bool;
}

/// Filter accepting every unit (the default for collectors).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptAll;

impl<U: ?Sized> Filter<U> for AcceptAll {
    #[inline]
    fn accept(&self, _unit: &U) -> bool {
        true
    }
}

impl<U, F> Filter<U> for F
where
    U: ?Sized,
    F: Fn(&U) -> bool + Send + Sync,
{
    #[inline]
    fn accept(&self, unit: &U) -> bool {
        self(unit)
    }
}

/// Builder helpers for composing filters.
pub trait FilterExt<U: ?Sized>: Filter<U> + Sized + 'static {
    /// Accept only when both `self` and `other` accept.
    fn and<F: Filter<U> + 'static>(self, other: F) -> AndFilter<U> {
        AndFilter::new().with(self).with(other)
    }

    /// Accept when either `self` or `other` accepts.
    fn or<F: Filter<U> + 'static>(self, other: F) -> OrFilter<U> {
        OrFilter::new().with(self).with(other)
    }

    /// Invert this filter.
    fn not(self) -> NotFilter<U> {
        NotFilter::new(self)
    }

    /// Type-erase into a shareable filter.
    fn shared(self) -> Arc<dyn Filter<U>> {
        Arc::new(self)
    }
}

impl<U: ?Sized, F: Filter<U> + Sized + 'static> FilterExt<U> for F {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.accept(&0u8));
        assert!(AcceptAll.accept("anything"));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |s: &str| s.starts_with("iq");
        assert!(filter.accept("iq-1"));
        assert!(!filter.accept("msg-1"));
    }

    #[test]
    fn test_shared_filter_delegates() {
        let shared: Arc<dyn Filter<u32>> = (|n: &u32| *n > 3).shared();
        assert!(shared.accept(&4));
        assert!(!shared.accept(&3));
    }

    #[test]
    fn test_ext_composition() {
        let filter = (|n: &u32| *n > 3).and(|n: &u32| *n < 8).not();
        assert!(filter.accept(&2));
        assert!(!filter.accept(&5));
        assert!(filter.accept(&9));
    }
}
