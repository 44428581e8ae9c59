// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Rollover, reuse and timeout integration tests
//!
//! Validates the bounded-buffer behaviour through the public API.

use hwire::{Collector, Error};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimal protocol unit carrying an id.
#[derive(Debug)]
struct TestPacket {
    id: String,
}

impl TestPacket {
    fn new(i: u32) -> Arc<Self> {
        Arc::new(Self { id: i.to_string() })
    }
}

fn next_id(collector: &Collector<TestPacket>) -> Option<String> {
    collector.await_forever().map(|p| p.id.clone())
}

fn poll_id(collector: &Collector<TestPacket>) -> Option<String> {
    collector.poll().map(|p| p.id.clone())
}

#[test]
fn test_rollover_then_reuse() {
    let collector = Collector::<TestPacket>::new(None, 5).expect("collector");

    for i in 0..6 {
        collector.ingest(&TestPacket::new(i));
    }

    // '0' has rolled off
    assert_eq!(next_id(&collector).as_deref(), Some("1"));
    assert_eq!(next_id(&collector).as_deref(), Some("2"));
    assert_eq!(next_id(&collector).as_deref(), Some("3"));
    assert_eq!(next_id(&collector).as_deref(), Some("4"));
    assert_eq!(poll_id(&collector).as_deref(), Some("5"));
    assert!(poll_id(&collector).is_none());

    for i in 10..15 {
        collector.ingest(&TestPacket::new(i));
    }

    assert_eq!(next_id(&collector).as_deref(), Some("10"));
    assert_eq!(next_id(&collector).as_deref(), Some("11"));
    assert_eq!(next_id(&collector).as_deref(), Some("12"));
    assert_eq!(next_id(&collector).as_deref(), Some("13"));
    assert_eq!(poll_id(&collector).as_deref(), Some("14"));
    assert!(poll_id(&collector).is_none());

    let start = Instant::now();
    assert!(collector.await_timeout(Duration::from_millis(1000)).is_none());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1000), "early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3000), "late: {:?}", elapsed);
}

#[test]
fn test_large_overflow_keeps_tail() {
    for capacity in [1usize, 3, 16] {
        let collector = Collector::<TestPacket>::new(None, capacity).expect("collector");
        let total = capacity as u32 * 4 + 1;
        for i in 0..total {
            collector.ingest(&TestPacket::new(i));
        }

        let drained: Vec<String> = std::iter::from_fn(|| poll_id(&collector)).collect();
        let expected: Vec<String> = (total - capacity as u32..total)
            .map(|i| i.to_string())
            .collect();
        assert_eq!(drained, expected, "capacity {}", capacity);
        assert_eq!(
            collector.evicted_count(),
            u64::from(total) - capacity as u64
        );
    }
}

#[test]
fn test_reject_all_filter_never_buffers() {
    let collector = Collector::<TestPacket>::builder()
        .filter(|_: &TestPacket| false)
        .capacity(5)
        .build()
        .expect("collector");

    for i in 0..1000 {
        collector.ingest(&TestPacket::new(i));
    }
    assert!(collector.poll().is_none());
    assert!(collector
        .await_timeout(Duration::from_millis(20))
        .is_none());
}

#[test]
fn test_zero_capacity_is_rejected() {
    assert!(matches!(
        Collector::<TestPacket>::new(None, 0),
        Err(Error::InvalidCapacity(0))
    ));
}

#[test]
fn test_cancelled_collector_stays_empty() {
    let collector = Collector::<TestPacket>::new(None, 5).expect("collector");
    collector.ingest(&TestPacket::new(1));
    collector.cancel();

    for i in 2..10 {
        assert!(!collector.ingest(&TestPacket::new(i)));
    }
    assert!(collector.poll().is_none());
    assert!(collector.await_forever().is_none());
    assert!(matches!(
        collector.await_or_fail(Duration::from_millis(5)),
        Err(Error::NoResponse { .. })
    ));
}
