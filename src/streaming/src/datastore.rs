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

//! The unary RPC dispatcher (§4.7): stream construction plus one-shot
//! commit and batch-get calls.
//!
//! Unlike [`crate::stream::base::Stream`], a unary call has no lifecycle to
//! track: it authenticates, opens one RPC, sends exactly one request frame,
//! collects every inbound frame until the transport signals completion, and
//! reports a single result. The auth/header boilerplate is deliberately the
//! same shape as the stream's `open_rpc` step (§4.4.2) — both ultimately
//! install the same headers onto the same kind of RPC handle — but a unary
//! call owns no long-lived state worth factoring into `Stream`.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::HeaderMap;

use firestore_mobile_gax::{Error, Result};
use firestore_mobile_transport::credentials::dynamic::CredentialsProvider;
use firestore_mobile_transport::{headers, BufferedWriter, CallbackTarget, Transport, WorkerQueue};

use crate::backoff::BackoffConfig;
use crate::database_info::DatabaseInfo;
use crate::model::{CommitResult, DocumentKey, LookupResult, Mutation};
use crate::serializer::Serializer;
use crate::stream::watch::WatchStream;
use crate::stream::write::WriteStream;
use crate::SDK_VERSION;

pub const COMMIT_PATH: &str = "/google.firestore.v1beta1.Firestore/Commit";
pub const BATCH_GET_PATH: &str = "/google.firestore.v1beta1.Firestore/BatchGetDocuments";

/// Creates watch/write streams and executes the datastore's two unary RPCs
/// (§4.7).
///
/// A `Datastore` does not track the streams it creates; each is transferred
/// to its caller outright (§3). It does own the pieces every RPC it issues
/// needs: the worker queue every callback is marshalled onto, the
/// credentials provider, the wire serializer, and the database identity.
#[derive(Clone)]
pub struct Datastore {
    queue: WorkerQueue,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialsProvider>,
    database_info: Arc<DatabaseInfo>,
    serializer: Arc<dyn Serializer>,
    backoff_config: BackoffConfig,
}

impl Datastore {
    pub fn new(
        queue: WorkerQueue,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialsProvider>,
        database_info: Arc<DatabaseInfo>,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        Self::with_backoff_config(queue, transport, credentials, database_info, serializer, BackoffConfig::default())
    }

    pub fn with_backoff_config(
        queue: WorkerQueue,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialsProvider>,
        database_info: Arc<DatabaseInfo>,
        serializer: Arc<dyn Serializer>,
        backoff_config: BackoffConfig,
    ) -> Self {
        Self {
            queue,
            transport,
            credentials,
            database_info,
            serializer,
            backoff_config,
        }
    }

    /// Builds a fresh, un-started watch stream (§4.5). Ownership transfers
    /// to the caller; this datastore keeps no reference to it.
    pub fn create_watch_stream(&self) -> WatchStream {
        WatchStream::new(
            self.serializer.clone(),
            self.queue.clone(),
            self.transport.clone(),
            self.credentials.clone(),
            self.database_info.clone(),
            self.backoff_config,
        )
    }

    /// Builds a fresh, un-started write stream (§4.6).
    pub fn create_write_stream(&self) -> WriteStream {
        WriteStream::new(
            self.serializer.clone(),
            self.queue.clone(),
            self.transport.clone(),
            self.credentials.clone(),
            self.database_info.clone(),
            self.backoff_config,
        )
    }

    /// Commits `mutations` in a single unary RPC. `completion` runs on the
    /// worker queue (§4.7 step 3) with the normalized result.
    pub fn commit(&self, mutations: Vec<Mutation>, completion: impl FnOnce(Result<CommitResult>) + Send + 'static) {
        let request = self.serializer.encode_commit_request(&self.database_info, &mutations);
        let request = match request {
            Ok(bytes) => bytes,
            Err(err) => {
                self.queue.dispatch_async_allowing_same_queue(move || completion(Err(err)));
                return;
            }
        };
        self.execute_unary(COMMIT_PATH, request, Self::decode_commit, completion);
    }

    /// Looks up `keys` via a unary batch-get RPC. The server streams one
    /// frame per key; frames are accumulated until the RPC completes and
    /// then decoded and merged into a single [`LookupResult`] (§4.7).
    pub fn lookup(&self, keys: Vec<DocumentKey>, completion: impl FnOnce(Result<LookupResult>) + Send + 'static) {
        let request = self.serializer.encode_lookup_request(&self.database_info, &keys);
        let request = match request {
            Ok(bytes) => bytes,
            Err(err) => {
                self.queue.dispatch_async_allowing_same_queue(move || completion(Err(err)));
                return;
            }
        };
        self.execute_unary(BATCH_GET_PATH, request, Self::decode_lookup, completion);
    }

    fn decode_commit(serializer: &dyn Serializer, frames: Vec<Bytes>) -> Result<CommitResult> {
        let bytes = frames.into_iter().next().unwrap_or_default();
        serializer.decode_commit_response(bytes)
    }

    fn decode_lookup(serializer: &dyn Serializer, frames: Vec<Bytes>) -> Result<LookupResult> {
        let mut merged = LookupResult::default();
        for bytes in frames {
            let mut decoded = serializer.decode_lookup_response(bytes)?;
            merged.entries.append(&mut decoded.entries);
        }
        Ok(merged)
    }

    /// Shared shape of a unary call: acquire a token, open an RPC, send the
    /// one encoded request frame, collect inbound frames until the
    /// transport reports completion, then decode and hand the result to
    /// `completion` on the worker queue (§4.7).
    fn execute_unary<T: Send + 'static>(
        &self,
        path: &'static str,
        request: Bytes,
        decode: fn(&dyn Serializer, Vec<Bytes>) -> Result<T>,
        completion: impl FnOnce(Result<T>) + Send + 'static,
    ) {
        let credentials = self.credentials.clone();
        let queue = self.queue.clone();
        let transport = self.transport.clone();
        let database_info = self.database_info.clone();
        let serializer = self.serializer.clone();

        tokio::spawn(async move {
            let token = credentials.get_token(false).await;
            let queue_for_job = queue.clone();
            queue.dispatch_async_allowing_same_queue(move || {
                queue_for_job.verify_is_current_queue();
                let token = match token {
                    Ok(token) => token.token,
                    Err(err) => {
                        completion(Err(err));
                        return;
                    }
                };

                let writer = Arc::new(BufferedWriter::new());
                let endpoint = database_info.endpoint();
                let mut rpc = match transport.create_rpc(&endpoint, path, writer.clone()) {
                    Ok(rpc) => rpc,
                    Err(err) => {
                        completion(Err(err));
                        return;
                    }
                };

                let mut request_headers = HeaderMap::new();
                headers::install_common_headers(
                    &mut request_headers,
                    SDK_VERSION,
                    database_info.project_id(),
                    database_info.database_id(),
                    "",
                );
                rpc.set_request_headers(request_headers);
                rpc.set_oauth2_access_token(token);

                let target: Arc<dyn CallbackTarget> = Arc::new(UnaryCallbackTarget {
                    queue: queue_for_job.clone(),
                    frames: Mutex::new(Vec::new()),
                    serializer: serializer.clone(),
                    decode,
                    completion: Mutex::new(Some(Box::new(completion))),
                });
                rpc.start(target);

                writer.write_value(request);
                writer.finish_with_error(None);

                // The rpc handle's own task (spawned inside `start`) now
                // owns everything needed to drive this call to completion;
                // this local handle has nothing further to do with it.
                drop(rpc);
            });
        });
    }
}

type CompletionFn<T> = Box<dyn FnOnce(Result<T>) + Send>;

/// Accumulates inbound frames for one in-flight unary call and, once the
/// transport reports completion, decodes them and delivers the result on
/// the worker queue.
struct UnaryCallbackTarget<T: Send + 'static> {
    queue: WorkerQueue,
    frames: Mutex<Vec<Bytes>>,
    serializer: Arc<dyn Serializer>,
    decode: fn(&dyn Serializer, Vec<Bytes>) -> Result<T>,
    completion: Mutex<Option<CompletionFn<T>>>,
}

impl<T: Send + 'static> CallbackTarget for UnaryCallbackTarget<T> {
    fn write_value(&self, bytes: Bytes) {
        self.frames.lock().unwrap().push(bytes);
    }

    fn writes_finished_with_error(&self, err: Option<Error>) {
        let frames = std::mem::take(&mut *self.frames.lock().unwrap());
        let Some(completion) = self.completion.lock().unwrap().take() else {
            // A second close callback after the first already completed
            // this call; nothing left to deliver to.
            return;
        };
        let serializer = self.serializer.clone();
        let decode = self.decode;
        let queue_for_job = self.queue.clone();
        self.queue.dispatch_async_allowing_same_queue(move || {
            queue_for_job.verify_is_current_queue();
            let result = match err {
                Some(err) => Err(err),
                None => decode(serializer.as_ref(), frames),
            };
            completion(result);
        });
    }
}
