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

//! A JSON-backed [`Serializer`] fake for exercising the streaming client
//! core without any real Firestore wire format.
//!
//! Wire frames are JSON objects; this is a test-only stand-in for whatever
//! `prost`-based serializer a real SDK build supplies (§1, §6 — the
//! serializer is explicitly out of scope for this crate).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use firestore_mobile_gax::{Error, Result};
use firestore_mobile_streaming::database_info::DatabaseInfo;
use firestore_mobile_streaming::model::{
    CommitResult, DocumentKey, LookupEntry, LookupResult, Mutation, QueryData, SnapshotVersion, WatchChange, WriteResponseMessage, WriteResult,
};
use firestore_mobile_streaming::serializer::Serializer;

#[derive(Serialize, Deserialize)]
struct AddTargetFrame {
    target_id: i32,
    encoded_query: Vec<u8>,
    resume_token: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct RemoveTargetFrame {
    target_id: i32,
}

#[derive(Serialize, Deserialize)]
enum WatchChangeWire {
    DocumentChange { keys: Vec<String>, document: Vec<u8> },
    DocumentDelete { key: String },
    TargetChange { target_ids: Vec<i32>, cause: Option<(i32, String)> },
    FilterUpdate { target_id: i32, count: i32 },
}

#[derive(Serialize, Deserialize)]
struct ListenResponseFrame {
    change: WatchChangeWire,
    version: i64,
}

#[derive(Serialize, Deserialize)]
struct WriteHandshakeFrame {
    database: String,
}

#[derive(Serialize, Deserialize)]
struct MutationWire(Vec<u8>);

#[derive(Serialize, Deserialize)]
struct WriteRequestFrame {
    mutations: Vec<MutationWire>,
    stream_token: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
pub struct WriteResultWire {
    update_time: Option<i64>,
    transform_results: Vec<Vec<u8>>,
}

#[derive(Serialize, Deserialize)]
struct WriteResponseFrame {
    stream_token: Vec<u8>,
    commit_version: Option<i64>,
    results: Vec<WriteResultWire>,
}

#[derive(Serialize, Deserialize)]
struct CommitRequestFrame {
    database: String,
    mutations: Vec<MutationWire>,
}

#[derive(Serialize, Deserialize)]
struct CommitResponseFrame {
    commit_time: i64,
    write_results: Vec<WriteResultWire>,
}

#[derive(Serialize, Deserialize)]
struct LookupRequestFrame {
    database: String,
    keys: Vec<String>,
}

#[derive(Serialize, Deserialize)]
enum LookupEntryWire {
    Found { key: String, document: Vec<u8>, read_time: i64 },
    Missing { key: String, read_time: i64 },
}

#[derive(Serialize, Deserialize)]
struct LookupResponseFrame {
    entries: Vec<LookupEntryWire>,
}

fn encode<T: Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value).map(Bytes::from).map_err(Error::serde)
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: Bytes) -> Result<T> {
    serde_json::from_slice(&bytes).map_err(Error::serde)
}

fn write_result_to_wire(result: &WriteResult) -> WriteResultWire {
    WriteResultWire {
        update_time: result.update_time.map(|v| v.0),
        transform_results: result.transform_results.iter().map(|b| b.to_vec()).collect(),
    }
}

fn write_result_from_wire(wire: WriteResultWire) -> WriteResult {
    WriteResult {
        update_time: wire.update_time.map(SnapshotVersion),
        transform_results: wire.transform_results.into_iter().map(Bytes::from).collect(),
    }
}

/// A [`Serializer`] implementation backed by `serde_json`, used throughout
/// this crate's integration tests in place of a real `prost`-generated
/// codec.
#[derive(Default)]
pub struct FakeSerializer;

impl Serializer for FakeSerializer {
    fn encode_add_target(&self, query: &QueryData) -> Result<Bytes> {
        encode(&AddTargetFrame {
            target_id: query.target_id,
            encoded_query: query.encoded_query.to_vec(),
            resume_token: query.resume_token.to_vec(),
        })
    }

    fn encode_remove_target(&self, target_id: i32) -> Result<Bytes> {
        encode(&RemoveTargetFrame { target_id })
    }

    fn decode_listen_response(&self, bytes: Bytes) -> Result<(WatchChange, SnapshotVersion)> {
        let frame: ListenResponseFrame = decode(bytes)?;
        let change = match frame.change {
            WatchChangeWire::DocumentChange { keys, document } => WatchChange::DocumentChange {
                keys: keys.into_iter().map(DocumentKey).collect(),
                document: Bytes::from(document),
            },
            WatchChangeWire::DocumentDelete { key } => WatchChange::DocumentDelete { key: DocumentKey(key) },
            WatchChangeWire::TargetChange { target_ids, cause } => WatchChange::TargetChange {
                target_ids,
                cause: cause.map(|(code, message)| firestore_mobile_gax::Status::new(code.into(), message)),
            },
            WatchChangeWire::FilterUpdate { target_id, count } => WatchChange::FilterUpdate { target_id, count },
        };
        Ok((change, SnapshotVersion(frame.version)))
    }

    fn encode_write_handshake(&self, database_info: &DatabaseInfo) -> Result<Bytes> {
        encode(&WriteHandshakeFrame {
            database: database_info.resource_prefix(),
        })
    }

    fn encode_write_mutations(&self, mutations: &[Mutation], stream_token: &[u8]) -> Result<Bytes> {
        encode(&WriteRequestFrame {
            mutations: mutations.iter().map(|m| MutationWire(m.0.to_vec())).collect(),
            stream_token: stream_token.to_vec(),
        })
    }

    fn decode_write_response(&self, bytes: Bytes) -> Result<WriteResponseMessage> {
        let frame: WriteResponseFrame = decode(bytes)?;
        Ok(WriteResponseMessage {
            stream_token: Bytes::from(frame.stream_token),
            commit_version: frame.commit_version.map(SnapshotVersion),
            results: frame.results.into_iter().map(write_result_from_wire).collect(),
        })
    }

    fn encode_commit_request(&self, database_info: &DatabaseInfo, mutations: &[Mutation]) -> Result<Bytes> {
        encode(&CommitRequestFrame {
            database: database_info.resource_prefix(),
            mutations: mutations.iter().map(|m| MutationWire(m.0.to_vec())).collect(),
        })
    }

    fn decode_commit_response(&self, bytes: Bytes) -> Result<CommitResult> {
        let frame: CommitResponseFrame = decode(bytes)?;
        Ok(CommitResult {
            commit_time: SnapshotVersion(frame.commit_time),
            write_results: frame.write_results.into_iter().map(write_result_from_wire).collect(),
        })
    }

    fn encode_lookup_request(&self, database_info: &DatabaseInfo, keys: &[DocumentKey]) -> Result<Bytes> {
        encode(&LookupRequestFrame {
            database: database_info.resource_prefix(),
            keys: keys.iter().map(|k| k.0.clone()).collect(),
        })
    }

    fn decode_lookup_response(&self, bytes: Bytes) -> Result<LookupResult> {
        let frame: LookupResponseFrame = decode(bytes)?;
        let entries = frame
            .entries
            .into_iter()
            .map(|entry| match entry {
                LookupEntryWire::Found { key, document, read_time } => LookupEntry::Found {
                    key: DocumentKey(key),
                    document: Bytes::from(document),
                    read_time: SnapshotVersion(read_time),
                },
                LookupEntryWire::Missing { key, read_time } => LookupEntry::Missing {
                    key: DocumentKey(key),
                    read_time: SnapshotVersion(read_time),
                },
            })
            .collect();
        Ok(LookupResult { entries })
    }
}

pub fn write_result_wire_for_test(update_time: i64) -> WriteResultWire {
    WriteResultWire {
        update_time: Some(update_time),
        transform_results: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn encode_write_response_for_test(stream_token: &[u8], commit_version: Option<i64>, results: Vec<WriteResultWire>) -> Bytes {
    encode(&WriteResponseFrame {
        stream_token: stream_token.to_vec(),
        commit_version,
        results,
    })
    .expect("encoding a well-formed test frame never fails")
}

#[allow(dead_code)]
pub fn write_result_to_wire_for_test(result: &WriteResult) -> WriteResultWire {
    write_result_to_wire(result)
}

pub fn test_encode_commit_response(commit_time: i64, update_time: i64) -> Bytes {
    encode(&CommitResponseFrame {
        commit_time,
        write_results: vec![write_result_wire_for_test(update_time)],
    })
    .expect("encoding a well-formed test frame never fails")
}

pub fn test_encode_watch_target_change(version: i64) -> Bytes {
    encode(&ListenResponseFrame {
        change: WatchChangeWire::TargetChange {
            target_ids: vec![1],
            cause: None,
        },
        version,
    })
    .expect("encoding a well-formed test frame never fails")
}

pub fn test_encode_lookup_missing(key: &str, read_time: i64) -> Bytes {
    encode(&LookupResponseFrame {
        entries: vec![LookupEntryWire::Missing {
            key: key.to_string(),
            read_time,
        }],
    })
    .expect("encoding a well-formed test frame never fails")
}
