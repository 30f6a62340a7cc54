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

//! The abstract wire-format boundary (§1, §6).
//!
//! Nothing upstream of this trait knows the Firestore protobuf schema;
//! frames move through the stream and datastore layers as opaque [`Bytes`],
//! encoded and decoded only here. A concrete implementation typically wraps
//! `prost`-generated message types, but that is an implementation detail of
//! whatever crate supplies one — this crate ships only the trait (and, for
//! its own tests, a JSON-backed fake).

use bytes::Bytes;

use firestore_mobile_gax::Result;

use crate::database_info::DatabaseInfo;
use crate::model::{CommitResult, DocumentKey, LookupResult, Mutation, QueryData, SnapshotVersion, WatchChange, WriteResponseMessage};

/// Encodes requests and decodes responses for every RPC the streaming
/// client core issues.
pub trait Serializer: Send + Sync + 'static {
    fn encode_add_target(&self, query: &QueryData) -> Result<Bytes>;
    fn encode_remove_target(&self, target_id: i32) -> Result<Bytes>;
    fn decode_listen_response(&self, bytes: Bytes) -> Result<(WatchChange, SnapshotVersion)>;

    fn encode_write_handshake(&self, database_info: &DatabaseInfo) -> Result<Bytes>;
    fn encode_write_mutations(&self, mutations: &[Mutation], stream_token: &[u8]) -> Result<Bytes>;
    fn decode_write_response(&self, bytes: Bytes) -> Result<WriteResponseMessage>;

    fn encode_commit_request(&self, database_info: &DatabaseInfo, mutations: &[Mutation]) -> Result<Bytes>;
    fn decode_commit_response(&self, bytes: Bytes) -> Result<CommitResult>;

    fn encode_lookup_request(&self, database_info: &DatabaseInfo, keys: &[DocumentKey]) -> Result<Bytes>;
    fn decode_lookup_response(&self, bytes: Bytes) -> Result<LookupResult>;
}
