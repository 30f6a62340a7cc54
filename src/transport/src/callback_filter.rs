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

//! The shim that guarantees "no delegate callbacks after `stop()`".
//!
//! The transport may deliver a final close event from a foreign thread
//! after a stream has already decided to stop and returned control to its
//! caller. A [`CallbackFilter`] sits between the transport's callback
//! target and the stream: the stream flips it to non-passthrough *before*
//! releasing its reference to the rpc, and every transport callback checks
//! it first. This is the one piece of stream state that is deliberately
//! read from a foreign thread rather than marshalled onto the worker queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A one-shot, thread-safe gate for transport callbacks.
///
/// Starts open (`passthrough = true`). Once [`CallbackFilter::disable`] is
/// called, it stays disabled forever; there is no way to re-enable an
/// existing filter, a fresh one is attached on every `start()`.
#[derive(Clone, Debug)]
pub struct CallbackFilter {
    passthrough: Arc<AtomicBool>,
}

impl CallbackFilter {
    pub fn new() -> Self {
        Self {
            passthrough: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Disables the filter. Safe to call more than once, and safe to call
    /// concurrently with [`CallbackFilter::is_passthrough`] from the
    /// transport's thread.
    pub fn disable(&self) {
        self.passthrough.store(false, Ordering::SeqCst);
    }

    /// Whether callbacks should still be delivered. Read by the transport
    /// adapter before invoking the stream for each inbound event.
    pub fn is_passthrough(&self) -> bool {
        self.passthrough.load(Ordering::SeqCst)
    }
}

impl Default for CallbackFilter {
    fn default() -> Self {
        Self::new()
    }
}
