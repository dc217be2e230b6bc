// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bounded Queue
//!
//! Many-producer/many-consumer FIFO with a hard capacity and a `done`
//! sentinel, built on crossbeam channels.
//!
//! ## Semantics
//!
//! - [`push`](BoundedQueue::push) blocks while the queue is full; this is
//!   the backpressure mechanism, and producers never need to sleep
//! - [`wait_and_pop`](BoundedQueue::wait_and_pop) blocks while the queue
//!   is empty and not done; after [`done`](BoundedQueue::done) it drains
//!   the remaining items and then returns `None`
//! - [`size`](BoundedQueue::size) is an approximate count suitable for
//!   watermark checks
//!
//! Invariant: no item is lost or duplicated between a completed `push`
//! and the return of `wait_and_pop`.

use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

/// Bounded MPMC FIFO with shutdown draining.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    // Taken (dropped) by done(); push clones it out so a blocking send
    // never holds the lock.
    sender: Mutex<Option<Sender<T>>>,
    receiver: Receiver<T>,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    /// Pushes an item, blocking while the queue is full.
    ///
    /// Returns `false` when the queue is already done; the item is dropped
    /// in that case.
    pub fn push(&self, item: T) -> bool {
        let sender = self.sender.lock().clone();
        match sender {
            Some(sender) => sender.send(item).is_ok(),
            None => false,
        }
    }

    /// Pops the next item, blocking while the queue is empty and open.
    ///
    /// Returns `None` once the queue is done and drained.
    pub fn wait_and_pop(&self) -> Option<T> {
        self.receiver.recv().ok()
    }

    /// Marks the queue done: no further pushes succeed, poppers drain the
    /// remaining items and then observe the end. Idempotent.
    pub fn done(&self) {
        self.sender.lock().take();
    }

    /// Approximate number of queued items
    pub fn size(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true once `done` has been called
    pub fn is_done(&self) -> bool {
        self.sender.lock().is_none()
    }
}
