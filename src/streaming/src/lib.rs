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

//! The streaming RPC client core (§1): the watch/write stream state
//! machines and the unary datastore dispatcher that sit between a mobile
//! document-database SDK's object model and its transport.
//!
//! This crate knows the Firestore watch/write protocol shape (targets,
//! handshakes, stream tokens, commit versions) but nothing about documents,
//! queries, or the local cache — those are built on top, one layer up.
//! Everything here runs on the single [`firestore_mobile_transport::WorkerQueue`]
//! a caller supplies; see [`stream`] for the state machine and [`datastore`]
//! for the unary dispatcher.

pub mod backoff;
pub mod database_info;
pub mod datastore;
pub mod model;
pub mod serializer;
pub mod stream;

pub use database_info::DatabaseInfo;
pub use datastore::Datastore;
pub use stream::watch::WatchStream;
pub use stream::write::WriteStream;

/// The SDK version advertised in the `x-goog-api-client` header (§6).
///
/// A real client stamps this from its own release process; the core only
/// needs a stable string to format into the header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
