// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logical combinators over filters (AND, OR, NOT).

use super::Filter;
use std::fmt;
use std::sync::Arc;

/// Accepts a unit only if every inner filter accepts it.
///
/// An empty `AndFilter` accepts everything. Evaluation short-circuits on the
/// first rejection, in insertion order.
pub struct AndFilter<U: ?Sized> {
    filters: Vec<Arc<dyn Filter<U>>>,
}

impl<U: ?Sized> AndFilter<U> {
    /// Create an empty AND filter
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Append a filter (builder style)
    #[must_use]
    pub fn with<F: Filter<U> + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append an already shared filter
    pub fn add(&mut self, filter: Arc<dyn Filter<U>>) {
        self.filters.push(filter);
    }

    /// Number of inner filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True if no filter was added
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<U: ?Sized> Default for AndFilter<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: ?Sized> Filter<U> for AndFilter<U> {
    fn accept(&self, unit: &U) -> bool {
        self.filters.iter().all(|f| f.accept(unit))
    }
}

impl<U: ?Sized> fmt::Debug for AndFilter<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Accepts a unit if any inner filter accepts it.
///
/// An empty `OrFilter` rejects everything.
pub struct OrFilter<U: ?Sized> {
    filters: Vec<Arc<dyn Filter<U>>>,
}

impl<U: ?Sized> OrFilter<U> {
    /// Create an empty OR filter
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Append a filter (builder style)
    #[must_use]
    pub fn with<F: Filter<U> + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append an already shared filter
    pub fn add(&mut self, filter: Arc<dyn Filter<U>>) {
        self.filters.push(filter);
    }

    /// Number of inner filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True if no filter was added
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<U: ?Sized> Default for OrFilter<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: ?Sized> Filter<U> for OrFilter<U> {
    fn accept(&self, unit: &U) -> bool {
        self.filters.iter().any(|f| f.accept(unit))
    }
}

impl<U: ?Sized> fmt::Debug for OrFilter<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Inverts the decision of the wrapped filter.
pub struct NotFilter<U: ?Sized> {
    inner: Arc<dyn Filter<U>>,
}

impl<U: ?Sized> NotFilter<U> {
    /// Wrap `filter`
    pub fn new<F: Filter<U> + 'static>(filter: F) -> Self {
        Self {
            inner: Arc::new(filter),
        }
    }

    /// Wrap an already shared filter
    pub fn from_shared(filter: Arc<dyn Filter<U>>) -> Self {
        Self { inner: filter }
    }
}

impl<U: ?Sized> Filter<U> for NotFilter<U> {
    fn accept(&self, unit: &U) -> bool {
        !self.inner.accept(unit)
    }
}

impl<U: ?Sized> fmt::Debug for NotFilter<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NotFilter")
    }
}
