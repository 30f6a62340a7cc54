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

//! The write stream (§4.6): client-push mutation submission gated by a
//! handshake.

use std::sync::Arc;

use bytes::Bytes;

use firestore_mobile_gax::{Error, Result};
use firestore_mobile_transport::credentials::dynamic::CredentialsProvider;
use firestore_mobile_transport::{Transport, WorkerQueue};

use crate::backoff::BackoffConfig;
use crate::database_info::DatabaseInfo;
use crate::model::{Mutation, SnapshotVersion, WriteResult};
use crate::serializer::Serializer;

use super::base::{Stream, StreamSpec, DEFAULT_IDLE_DURATION};

pub const WRITE_PATH: &str = "/google.firestore.v1beta1.Firestore/Write";

/// Receives events from a [`WriteStream`].
pub trait WriteDelegate: Send + Sync {
    fn on_open(&self);
    fn on_close(&self, err: Option<Error>);
    /// Fired once, after the first inbound frame of an attempt (§4.6).
    fn on_handshake_complete(&self);
    fn on_response(&self, commit_version: SnapshotVersion, results: Vec<WriteResult>);
}

pub(crate) struct WriteStreamSpec {
    serializer: Arc<dyn Serializer>,
    handshake_complete: bool,
    last_stream_token: Bytes,
}

impl StreamSpec for WriteStreamSpec {
    type Delegate = dyn WriteDelegate;
    type Message = crate::model::WriteResponseMessage;

    const PATH: &'static str = WRITE_PATH;

    fn decode(&self, bytes: Bytes) -> Result<Self::Message> {
        self.serializer.decode_write_response(bytes)
    }

    /// `start` resets `handshake_complete` to false on every fresh attempt
    /// (§4.6); `last_stream_token` persists across re-opens within the same
    /// process (§3) and is deliberately left untouched here.
    fn reset_for_start(&mut self) {
        self.handshake_complete = false;
    }

    fn deliver_open(&self, delegate: &Self::Delegate) {
        delegate.on_open();
    }

    fn deliver_close(&self, delegate: &Self::Delegate, err: Option<Error>) {
        delegate.on_close(err);
    }

    fn deliver_message(&mut self, delegate: &Self::Delegate, message: Self::Message) {
        self.last_stream_token = message.stream_token;
        if !self.handshake_complete {
            self.handshake_complete = true;
            delegate.on_handshake_complete();
        } else {
            let version = message.commit_version.unwrap_or(SnapshotVersion(0));
            delegate.on_response(version, message.results);
        }
    }
}

/// A long-lived channel submitting mutation batches and receiving commit
/// acknowledgements, gated by a handshake (§4.6).
#[derive(Clone)]
pub struct WriteStream {
    inner: Stream<WriteStreamSpec>,
    serializer: Arc<dyn Serializer>,
    database_info: Arc<DatabaseInfo>,
}

impl WriteStream {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        serializer: Arc<dyn Serializer>,
        queue: WorkerQueue,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialsProvider>,
        database_info: Arc<DatabaseInfo>,
        backoff_config: BackoffConfig,
    ) -> Self {
        let spec = WriteStreamSpec {
            serializer: serializer.clone(),
            handshake_complete: false,
            last_stream_token: Bytes::new(),
        };
        let inner = Stream::new(
            spec,
            queue,
            transport,
            credentials,
            database_info.clone(),
            backoff_config,
            DEFAULT_IDLE_DURATION,
        );
        Self {
            inner,
            serializer,
            database_info,
        }
    }

    pub fn start(&self, delegate: Arc<dyn WriteDelegate>) {
        self.inner.start(delegate);
    }

    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn mark_idle(&self) {
        self.inner.mark_idle();
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    pub fn is_started(&self) -> bool {
        self.inner.is_started()
    }

    pub fn handshake_complete(&self) -> bool {
        self.inner.with_spec(|spec| spec.handshake_complete)
    }

    /// Sends the handshake request. Requires the stream to be open and the
    /// handshake not already completed for this attempt (§4.6, invariant 4).
    pub fn write_handshake(&self) -> Result<()> {
        if !self.inner.is_open() {
            return Err(Error::other("write_handshake() requires an open stream"));
        }
        if self.handshake_complete() {
            return Err(Error::other("write_handshake() called after the handshake already completed"));
        }
        let bytes = self.serializer.encode_write_handshake(&self.database_info)?;
        self.inner.enqueue_frame(bytes)
    }

    /// Sends one batch of mutations plus the current stream token. Requires
    /// the stream to be open and the handshake to have completed (§4.6,
    /// invariant 4).
    pub fn write_mutations(&self, mutations: &[Mutation]) -> Result<()> {
        if !self.inner.is_open() {
            return Err(Error::other("write_mutations() requires an open stream"));
        }
        if !self.handshake_complete() {
            return Err(Error::other("write_mutations() requires a completed handshake"));
        }
        let token = self.inner.with_spec(|spec| spec.last_stream_token.clone());
        let bytes = self.serializer.encode_write_mutations(mutations, &token)?;
        self.inner.enqueue_frame(bytes)
    }
}
