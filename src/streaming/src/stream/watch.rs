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

//! The watch stream (§4.5): server-push document-change notifications.

use std::sync::Arc;

use firestore_mobile_gax::{Error, Result};
use firestore_mobile_transport::credentials::dynamic::CredentialsProvider;
use firestore_mobile_transport::{Transport, WorkerQueue};

use crate::backoff::BackoffConfig;
use crate::database_info::DatabaseInfo;
use crate::model::{QueryData, SnapshotVersion, WatchChange};
use crate::serializer::Serializer;

use super::base::{Stream, StreamSpec, DEFAULT_IDLE_DURATION};

pub const WATCH_PATH: &str = "/google.firestore.v1beta1.Firestore/Listen";

/// Receives events from a [`WatchStream`].
pub trait WatchDelegate: Send + Sync {
    fn on_open(&self);
    fn on_close(&self, err: Option<Error>);
    fn on_change(&self, change: WatchChange, version: SnapshotVersion);
}

pub(crate) struct WatchStreamSpec {
    serializer: Arc<dyn Serializer>,
}

impl StreamSpec for WatchStreamSpec {
    type Delegate = dyn WatchDelegate;
    type Message = (WatchChange, SnapshotVersion);

    const PATH: &'static str = WATCH_PATH;

    fn decode(&self, bytes: bytes::Bytes) -> Result<Self::Message> {
        self.serializer.decode_listen_response(bytes)
    }

    fn reset_for_start(&mut self) {}

    fn deliver_open(&self, delegate: &Self::Delegate) {
        delegate.on_open();
    }

    fn deliver_close(&self, delegate: &Self::Delegate, err: Option<Error>) {
        delegate.on_close(err);
    }

    fn deliver_message(&mut self, delegate: &Self::Delegate, message: Self::Message) {
        let (change, version) = message;
        delegate.on_change(change, version);
    }
}

/// A long-lived channel carrying document-change notifications for
/// subscribed queries.
#[derive(Clone)]
pub struct WatchStream {
    inner: Stream<WatchStreamSpec>,
    serializer: Arc<dyn Serializer>,
}

impl WatchStream {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        serializer: Arc<dyn Serializer>,
        queue: WorkerQueue,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialsProvider>,
        database_info: Arc<DatabaseInfo>,
        backoff_config: BackoffConfig,
    ) -> Self {
        let spec = WatchStreamSpec {
            serializer: serializer.clone(),
        };
        let inner = Stream::new(
            spec,
            queue,
            transport,
            credentials,
            database_info,
            backoff_config,
            DEFAULT_IDLE_DURATION,
        );
        Self { inner, serializer }
    }

    pub fn start(&self, delegate: Arc<dyn WatchDelegate>) {
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

    /// Sends an "add target" request. Requires the stream to be open.
    pub fn watch(&self, query: QueryData) -> Result<()> {
        if !self.inner.is_open() {
            return Err(Error::other("watch() requires an open stream"));
        }
        let bytes = self.serializer.encode_add_target(&query)?;
        self.inner.enqueue_frame(bytes)
    }

    /// Sends a "remove target" request. Requires the stream to be open.
    pub fn unwatch(&self, target_id: i32) -> Result<()> {
        if !self.inner.is_open() {
            return Err(Error::other("unwatch() requires an open stream"));
        }
        let bytes = self.serializer.encode_remove_target(target_id)?;
        self.inner.enqueue_frame(bytes)
    }
}
