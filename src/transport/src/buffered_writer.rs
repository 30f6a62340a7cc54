// Copyright 2026 The firestore-mobile-core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A bounded producer queue of outbound frames, draining into a transport's
//! send half.
//!
//! Unlike the rest of the stream's state, this is accessed from both the
//! worker queue (producing frames) and the transport (consuming them,
//! possibly from a foreign thread as it signals flow-control readiness), so
//! it is guarded by a plain mutex rather than relying on worker-queue
//! exclusivity.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use tokio::sync::Notify;

use firestore_mobile_gax::Error;

/// One queued frame, or the sentinel marking that no more frames will come.
enum Entry {
    Frame(Bytes),
    Finished(Option<Error>),
}

struct Inner {
    pending: VecDeque<Entry>,
    closed: bool,
}

/// A mutex-guarded queue of outbound byte frames plus a "finished" sentinel.
pub struct BufferedWriter {
    inner: Mutex<Inner>,
    // Woken on every write/close so an async drainer (the tonic adapter, or
    // any other transport pulling frames from a tokio task) does not have to
    // busy-poll `poll_next`.
    readable: Notify,
}

impl BufferedWriter {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                closed: false,
            }),
            readable: Notify::new(),
        }
    }

    /// Appends one frame. Silently dropped if the writer is already closed.
    pub fn write_value(&self, bytes: Bytes) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.pending.push_back(Entry::Frame(bytes));
        drop(inner);
        self.readable.notify_one();
    }

    /// Half-closes the writer, optionally with an error. Idempotent: once
    /// closed, further calls (and further writes) are no-ops.
    pub fn finish_with_error(&self, err: Option<Error>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.closed = true;
        inner.pending.push_back(Entry::Finished(err));
        drop(inner);
        self.readable.notify_one();
    }

    /// Pulls the next queued item, if any, for the transport to drain.
    pub fn poll_next(&self) -> Option<DrainedItem> {
        let mut inner = self.inner.lock().unwrap();
        match inner.pending.pop_front()? {
            Entry::Frame(bytes) => Some(DrainedItem::Frame(bytes)),
            Entry::Finished(err) => Some(DrainedItem::Finished(err)),
        }
    }

    /// Waits for the next queued item, for an async transport adapter that
    /// would rather await than poll. Once [`DrainedItem::Finished`] has been
    /// yielded once, every subsequent call yields it again immediately
    /// (`finish_with_error` leaves the sentinel in place, it does not drain
    /// it away).
    pub async fn next(&self) -> DrainedItem {
        loop {
            if let Some(item) = self.poll_next() {
                return item;
            }
            if self.is_closed() {
                // Closed with nothing pending: the sentinel was already
                // drained by a previous call. Keep yielding it so a caller
                // looping on `next()` terminates instead of hanging.
                return DrainedItem::Finished(None);
            }
            self.readable.notified().await;
        }
    }

    /// Whether [`BufferedWriter::finish_with_error`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

impl Default for BufferedWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// An item drained from a [`BufferedWriter`] by the transport.
pub enum DrainedItem {
    Frame(Bytes),
    Finished(Option<Error>),
}
