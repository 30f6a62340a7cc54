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

//! The abstract transport contract (§6): the one seam the streaming client
//! core depends on for actually moving bytes over HTTP/2.
//!
//! Nothing in this module knows about Firestore, watch changes, or commit
//! responses — it is a generic bidirectional byte-stream abstraction. The
//! concrete `tonic`-backed implementation lives in [`crate::tonic_transport`]
//! (feature `tonic-adapter`); tests exercise the core against an in-memory
//! fake instead.

use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;

use firestore_mobile_gax::Error;

use crate::buffered_writer::BufferedWriter;

/// Where a stream's bidirectional RPC is reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub ssl_enabled: bool,
}

/// Receives events for one RPC. Implemented by the stream (indirectly,
/// through the [`crate::callback_filter::CallbackFilter`] shim); invoked by
/// the transport, possibly from a foreign thread.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait CallbackTarget: Send + Sync {
    /// One inbound frame has arrived.
    fn write_value(&self, bytes: Bytes);
    /// The RPC is finished, successfully (`None`) or with an error.
    fn writes_finished_with_error(&self, err: Option<Error>);
}

/// A single bidirectional RPC in flight.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait RpcHandle: Send + Sync {
    /// Installs the headers to send with the initial request.
    fn set_request_headers(&mut self, headers: HeaderMap);

    /// Installs the bearer token to send with the initial request. Called
    /// instead of (or in addition to) setting an `Authorization` header
    /// directly, mirroring the transport contract's dedicated setter.
    fn set_oauth2_access_token(&mut self, token: String);

    /// The headers the peer sent back with the first frame, once available.
    fn response_headers(&self) -> Option<HeaderMap>;

    /// Starts the RPC, registering `callback_target` to receive inbound
    /// events from this point forward.
    fn start(&mut self, callback_target: Arc<dyn CallbackTarget>);

    /// Ends the RPC. `err` is `None` for a clean half-close.
    fn finish_with_error(&mut self, err: Option<Error>);
}

/// Produces [`RpcHandle`]s for a fixed RPC path.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Transport: Send + Sync {
    /// Creates (but does not start) an RPC handle for `path`, wired to drain
    /// outbound frames from `writer`.
    fn create_rpc(
        &self,
        endpoint: &Endpoint,
        path: &'static str,
        writer: Arc<BufferedWriter>,
    ) -> Result<Box<dyn RpcHandle>, Error>;
}
