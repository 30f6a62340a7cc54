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

//! An in-memory [`Transport`] fake: a test harness drives inbound frames
//! and closes directly, and inspects outbound frames the stream wrote,
//! without any real HTTP/2 connection.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::HeaderMap;

use firestore_mobile_gax::Error;
use firestore_mobile_transport::{BufferedWriter, CallbackTarget, DrainedItem, Endpoint, RpcHandle, Transport};

/// Creates [`FakeRpc`]s and remembers every one it creates, in creation
/// order, so a test can reach into the most recent attempt (e.g. after a
/// backoff-driven retry opens a fresh rpc).
#[derive(Clone, Default)]
pub struct FakeTransport {
    rpcs: Arc<Mutex<Vec<Arc<FakeRpc>>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently created rpc, if any.
    pub fn last_rpc(&self) -> Option<Arc<FakeRpc>> {
        self.rpcs.lock().unwrap().last().cloned()
    }

    pub fn rpc_count(&self) -> usize {
        self.rpcs.lock().unwrap().len()
    }
}

impl Transport for FakeTransport {
    fn create_rpc(&self, _endpoint: &Endpoint, path: &'static str, writer: Arc<BufferedWriter>) -> Result<Box<dyn RpcHandle>, Error> {
        let rpc = Arc::new(FakeRpc::new(path, writer));
        self.rpcs.lock().unwrap().push(rpc.clone());
        Ok(Box::new(FakeRpcHandle { rpc }))
    }
}

/// State of one RPC attempt a [`FakeTransport`] created.
///
/// Held by the test (via [`FakeTransport::last_rpc`]) *and* by the
/// [`FakeRpcHandle`] the stream owns; driving `deliver_frame`/`deliver_closed`
/// calls the callback target exactly the way a real transport would invoke
/// it, including after the stream has logically moved on (a test simulating
/// §4.4.3's "callback filter" race deliberately calls these after `stop()`).
pub struct FakeRpc {
    pub path: &'static str,
    writer: Arc<BufferedWriter>,
    callback: Mutex<Option<Arc<dyn CallbackTarget>>>,
    request_headers: Mutex<Option<HeaderMap>>,
    response_headers: Mutex<Option<HeaderMap>>,
    token: Mutex<Option<String>>,
    finished: Mutex<bool>,
}

impl FakeRpc {
    fn new(path: &'static str, writer: Arc<BufferedWriter>) -> Self {
        Self {
            path,
            writer,
            callback: Mutex::new(None),
            request_headers: Mutex::new(None),
            response_headers: Mutex::new(None),
            token: Mutex::new(None),
            finished: Mutex::new(false),
        }
    }

    /// Simulates the transport delivering one inbound frame.
    pub fn deliver_frame(&self, bytes: Bytes) {
        if let Some(callback) = self.callback.lock().unwrap().clone() {
            callback.write_value(bytes);
        }
    }

    /// Simulates the transport closing the rpc, successfully or with an
    /// error.
    pub fn deliver_closed(&self, err: Option<Error>) {
        if let Some(callback) = self.callback.lock().unwrap().clone() {
            callback.writes_finished_with_error(err);
        }
    }

    pub fn request_headers(&self) -> Option<HeaderMap> {
        self.request_headers.lock().unwrap().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    pub fn set_response_headers(&self, headers: HeaderMap) {
        *self.response_headers.lock().unwrap() = Some(headers);
    }

    /// Whether the stream (or dispatcher) has half-closed or cancelled this
    /// rpc from its side.
    pub fn is_finished(&self) -> bool {
        *self.finished.lock().unwrap()
    }

    /// Drains every outbound frame the stream has written so far, stopping
    /// at (and not consuming) the finished sentinel.
    pub fn drain_outbound(&self) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(item) = self.writer.poll_next() {
            match item {
                DrainedItem::Frame(bytes) => frames.push(bytes),
                DrainedItem::Finished(_) => break,
            }
        }
        frames
    }
}

struct FakeRpcHandle {
    rpc: Arc<FakeRpc>,
}

impl RpcHandle for FakeRpcHandle {
    fn set_request_headers(&mut self, headers: HeaderMap) {
        *self.rpc.request_headers.lock().unwrap() = Some(headers);
    }

    fn set_oauth2_access_token(&mut self, token: String) {
        *self.rpc.token.lock().unwrap() = Some(token);
    }

    fn response_headers(&self) -> Option<HeaderMap> {
        self.rpc.response_headers.lock().unwrap().clone()
    }

    fn start(&mut self, callback_target: Arc<dyn CallbackTarget>) {
        *self.rpc.callback.lock().unwrap() = Some(callback_target);
    }

    fn finish_with_error(&mut self, err: Option<Error>) {
        *self.rpc.finished.lock().unwrap() = true;
        self.rpc.writer.finish_with_error(err);
    }
}
