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

//! Minimal domain types the stream and datastore layers pass around.
//!
//! These are deliberately thin: document content, query definitions, and
//! mutation payloads are a concern of the local store and query engine
//! (§1, out of scope), so this crate carries them as opaque encoded bytes
//! and only models the shape the wire protocol itself cares about (keys,
//! versions, per-write results, stream tokens).

use bytes::Bytes;

use firestore_mobile_gax::Status;

/// A document's fully-qualified path, e.g. `projects/p/databases/(default)/documents/c/d`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentKey(pub String);

/// One encoded mutation (set/update/delete/transform), opaque to this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation(pub Bytes);

/// A server-assigned snapshot or commit version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotVersion(pub i64);

/// One subscribed query, as sent in a watch "add target" request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryData {
    pub target_id: i32,
    pub encoded_query: Bytes,
    pub resume_token: Bytes,
}

/// A decoded listen-response payload (§4.5).
#[derive(Clone, Debug)]
pub enum WatchChange {
    DocumentChange { keys: Vec<DocumentKey>, document: Bytes },
    DocumentDelete { key: DocumentKey },
    TargetChange { target_ids: Vec<i32>, cause: Option<Status> },
    FilterUpdate { target_id: i32, count: i32 },
}

/// The per-write outcome reported in a write-response (§4.6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteResult {
    pub update_time: Option<SnapshotVersion>,
    pub transform_results: Vec<Bytes>,
}

/// One decoded write-stream response frame.
///
/// The wire shape does not distinguish a handshake acknowledgement from a
/// mutation response other than by the absence of `commit_version` — the
/// stream layer (not the serializer) decides which one this is, based on
/// whether the handshake has already completed (§4.6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteResponseMessage {
    pub stream_token: Bytes,
    pub commit_version: Option<SnapshotVersion>,
    pub results: Vec<WriteResult>,
}

/// The result of a unary commit RPC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitResult {
    pub commit_time: SnapshotVersion,
    pub write_results: Vec<WriteResult>,
}

/// One document (or absence thereof) returned by a batch-get.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupEntry {
    Found {
        key: DocumentKey,
        document: Bytes,
        read_time: SnapshotVersion,
    },
    Missing {
        key: DocumentKey,
        read_time: SnapshotVersion,
    },
}

/// The result of a unary batch-get RPC.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LookupResult {
    pub entries: Vec<LookupEntry>,
}
