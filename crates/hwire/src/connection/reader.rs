// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inbound reader thread.
//!
//! Drains decoded packets from a channel and dispatches each one, in arrival
//! order, through the connection's registry. The single thread is the one
//! logical dispatch path of the connection.

use crate::config::{READER_POLL_INTERVAL, READER_THREAD_NAME};
use crate::packet::Packet;
use crate::registry::CollectorRegistry;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(super) fn spawn<U: Packet>(
    inbound: Receiver<U>,
    registry: Arc<CollectorRegistry<U>>,
    connected: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(READER_THREAD_NAME.to_string())
        .spawn(move || run(&inbound, &registry, &connected))
}

fn run<U: Packet>(
    inbound: &Receiver<U>,
    registry: &CollectorRegistry<U>,
    connected: &AtomicBool,
) {
    let mut dispatched: u64 = 0;

    // Poll with a timeout so disconnect() is noticed without inbound traffic
    while connected.load(Ordering::Acquire) {
        match inbound.recv_timeout(READER_POLL_INTERVAL) {
            Ok(packet) => {
                registry.dispatch(&Arc::new(packet));
                dispatched += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("[reader] inbound stream closed, connection lost");
                if connected.swap(false, Ordering::AcqRel) {
                    registry.cancel_all();
                }
                break;
            }
        }
    }

    log::debug!("[reader] exiting after {} packet(s)", dispatched);
}
