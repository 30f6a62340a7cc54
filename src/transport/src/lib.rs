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

//! Worker queue, buffered writer, callback filter, and the abstract
//! transport contract (§6) shared by the streaming client core.
//!
//! Nothing in this crate knows about Firestore watch/write protocol framing;
//! that lives one layer up, in `firestore-mobile-streaming`. This crate only
//! provides the plumbing: a serial scheduler, a thread-safe outbound frame
//! queue, the shim that silences transport callbacks after a stream stops,
//! and the trait boundary a concrete gRPC transport implements.

pub mod buffered_writer;
pub mod callback_filter;
pub mod credentials;
pub mod headers;
pub mod transport;
pub mod worker_queue;

#[cfg(feature = "tonic-adapter")]
pub mod tonic_transport;

pub use buffered_writer::{BufferedWriter, DrainedItem};
pub use callback_filter::CallbackFilter;
pub use credentials::{CredentialsProvider, GetTokenResult};
pub use transport::{CallbackTarget, Endpoint, RpcHandle, Transport};
pub use worker_queue::{spawn_then_dispatch, BoxFuture, DelayedTask, WorkerQueue};

#[cfg(any(test, feature = "test-util"))]
pub use transport::{MockCallbackTarget, MockRpcHandle, MockTransport};

#[cfg(any(test, feature = "test-util"))]
pub use credentials::dynamic::MockCredentialsProvider;
