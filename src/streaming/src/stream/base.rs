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

//! The generic stream engine shared by [`crate::stream::watch::WatchStream`]
//! and [`crate::stream::write::WriteStream`] (§4.4).
//!
//! [`StreamSpec`] is the capability parameter each concrete stream supplies
//! (§9, "abstract-method throwing base class"): decoding, and the three
//! places a concrete stream needs to reach its own delegate. Everything
//! else — the state machine, auth handshake, idle timer, backoff coupling,
//! and the transport callback filter — lives here once.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;

use firestore_mobile_gax::{Code, Error, Result, Status};
use firestore_mobile_transport::credentials::dynamic::CredentialsProvider;
use firestore_mobile_transport::{
    headers, BufferedWriter, CallbackFilter, CallbackTarget, DelayedTask, RpcHandle, Transport, WorkerQueue,
};

use crate::backoff::{BackoffConfig, BackoffController};
use crate::database_info::DatabaseInfo;
use crate::SDK_VERSION;

use super::state::StreamState;

/// The 60 s window after which an otherwise-healthy open stream is
/// proactively closed (§4.4.6).
pub const DEFAULT_IDLE_DURATION: Duration = Duration::from_secs(60);

/// The capability a concrete stream type supplies to [`Stream`].
///
/// `Delegate` is the caller-facing trait that stream type defines
/// (`WatchDelegate`, `WriteDelegate`, ...); `Message` is the decoded form of
/// one inbound frame.
pub trait StreamSpec: Send + Sync + 'static {
    type Delegate: ?Sized + Send + Sync;
    type Message: Send + 'static;

    /// The fixed RPC path this stream type is created against (§6).
    const PATH: &'static str;

    /// Decodes one inbound frame. A decode failure becomes an `Internal`
    /// error routed through the same close path as a transport error
    /// (§4.4.4).
    fn decode(&self, bytes: Bytes) -> Result<Self::Message>;

    /// Resets any per-attempt protocol state. Called every time `start`
    /// begins a fresh attempt (including backoff-driven retries).
    fn reset_for_start(&mut self);

    fn deliver_open(&self, delegate: &Self::Delegate);
    fn deliver_close(&self, delegate: &Self::Delegate, err: Option<Error>);
    fn deliver_message(&mut self, delegate: &Self::Delegate, message: Self::Message);
}

struct StreamCore<P: StreamSpec> {
    state: StreamState,
    spec: P,
    delegate: Option<Arc<P::Delegate>>,
    rpc: Option<Box<dyn RpcHandle>>,
    writer: Option<Arc<BufferedWriter>>,
    filter: Option<CallbackFilter>,
    idle: bool,
    idle_task: Option<DelayedTask>,
    message_received: bool,
    backoff: BackoffController,
    queue: WorkerQueue,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialsProvider>,
    database_info: Arc<DatabaseInfo>,
    idle_duration: Duration,
}

/// A handle to one stream's lifecycle (§3, `Stream`).
///
/// Cloning shares the same underlying state; every operation is dispatched
/// onto the worker queue the stream was created with, so concurrent callers
/// observe a single, serialized sequence of transitions.
pub struct Stream<P: StreamSpec> {
    core: Arc<Mutex<StreamCore<P>>>,
    queue: WorkerQueue,
}

impl<P: StreamSpec> Clone for Stream<P> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<P: StreamSpec> Stream<P> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        spec: P,
        queue: WorkerQueue,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialsProvider>,
        database_info: Arc<DatabaseInfo>,
        backoff_config: BackoffConfig,
        idle_duration: Duration,
    ) -> Self {
        let core = StreamCore {
            state: StreamState::Initial,
            spec,
            delegate: None,
            rpc: None,
            writer: None,
            filter: None,
            idle: false,
            idle_task: None,
            message_received: false,
            backoff: BackoffController::with_config(queue.clone(), backoff_config),
            transport,
            credentials,
            database_info,
            idle_duration,
            queue: queue.clone(),
        };
        Self {
            core: Arc::new(Mutex::new(core)),
            queue,
        }
    }

    pub fn is_open(&self) -> bool {
        self.core.lock().unwrap().state.is_open()
    }

    pub fn is_started(&self) -> bool {
        self.core.lock().unwrap().state.is_started()
    }

    pub fn start(&self, delegate: Arc<P::Delegate>) {
        let core = self.core.clone();
        self.queue.dispatch_async_allowing_same_queue(move || {
            handle_start(&core, delegate);
        });
    }

    pub fn stop(&self) {
        let core = self.core.clone();
        let queue = self.queue.clone();
        self.queue.dispatch_async_allowing_same_queue(move || {
            queue.verify_is_current_queue();
            let final_needed = {
                let guard = core.lock().unwrap();
                matches!(guard.state, StreamState::Auth | StreamState::Open | StreamState::Backoff)
            };
            if final_needed {
                close(&core, StreamState::Stopped, None);
            }
        });
    }

    pub fn mark_idle(&self) {
        let core = self.core.clone();
        self.queue.dispatch_async_allowing_same_queue(move || {
            handle_mark_idle(&core);
        });
    }

    pub(crate) fn with_spec<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.core.lock().unwrap().spec)
    }

    /// Precondition-checks `is_open`, then enqueues `bytes` as an outbound
    /// frame, cancelling the idle timer on the way (§4.4.1 "outbound write").
    pub(crate) fn enqueue_frame(&self, bytes: Bytes) -> Result<()> {
        if !self.is_open() {
            return Err(Error::other("stream is not open"));
        }
        let core = self.core.clone();
        let queue = self.queue.clone();
        self.queue.dispatch_async_allowing_same_queue(move || {
            queue.verify_is_current_queue();
            let mut guard = core.lock().unwrap();
            if !guard.state.is_open() {
                return;
            }
            guard.idle = false;
            if let Some(task) = guard.idle_task.take() {
                task.cancel();
            }
            if let Some(writer) = guard.writer.clone() {
                drop(guard);
                writer.write_value(bytes);
            }
        });
        Ok(())
    }
}

fn status_code(err: &Error) -> Code {
    err.as_inner::<Status>().map(|s| s.code).unwrap_or(Code::Unknown)
}

fn handle_start<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>, delegate: Arc<P::Delegate>) {
    let mut guard = core.lock().unwrap();
    guard.queue.verify_is_current_queue();
    match guard.state {
        StreamState::Initial => {
            guard.state = StreamState::Auth;
            guard.delegate = Some(delegate);
            guard.spec.reset_for_start();
            drop(guard);
            tracing::debug!("stream starting");
            begin_auth(core);
        }
        StreamState::Error => {
            guard.state = StreamState::Backoff;
            guard.delegate = Some(delegate);
            let core = core.clone();
            guard.backoff.run_after_delay(move || retry_after_backoff(&core));
        }
        _ => {
            // Backoff/Auth/Open/Stopped: start() is only meaningful from
            // Initial or Error (§4.4.1); elsewhere it is a no-op.
        }
    }
}

fn retry_after_backoff<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>) {
    let mut guard = core.lock().unwrap();
    if guard.state != StreamState::Backoff {
        return;
    }
    guard.state = StreamState::Auth;
    guard.spec.reset_for_start();
    drop(guard);
    tracing::debug!("stream retrying after backoff");
    begin_auth(core);
}

fn begin_auth<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>) {
    let (credentials, queue) = {
        let guard = core.lock().unwrap();
        (guard.credentials.clone(), guard.queue.clone())
    };
    let core = core.clone();
    tokio::spawn(async move {
        let result = credentials.get_token(false).await;
        queue.dispatch_async_allowing_same_queue(move || resume_after_auth(&core, result));
    });
}

fn resume_after_auth<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>, result: Result<firestore_mobile_transport::GetTokenResult>) {
    {
        let guard = core.lock().unwrap();
        guard.queue.verify_is_current_queue();
        if guard.state == StreamState::Stopped {
            return;
        }
    }
    match result {
        Err(err) => {
            tracing::debug!(error = %err, "authentication failed");
            close(core, StreamState::Error, Some(err));
        }
        Ok(token) => open_rpc(core, token.token),
    }
}

fn open_rpc<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>, token: String) {
    let mut guard = core.lock().unwrap();
    let writer = Arc::new(BufferedWriter::new());
    let endpoint = guard.database_info.endpoint();
    let mut rpc = match guard.transport.create_rpc(&endpoint, P::PATH, writer.clone()) {
        Ok(rpc) => rpc,
        Err(err) => {
            drop(guard);
            close(core, StreamState::Error, Some(err));
            return;
        }
    };

    let mut request_headers = HeaderMap::new();
    headers::install_common_headers(
        &mut request_headers,
        SDK_VERSION,
        guard.database_info.project_id(),
        guard.database_info.database_id(),
        "",
    );
    rpc.set_request_headers(request_headers);
    rpc.set_oauth2_access_token(token);

    let filter = CallbackFilter::new();
    let callback_target: Arc<dyn CallbackTarget> = Arc::new(StreamCallbackTarget {
        core: Arc::downgrade(core),
        queue: guard.queue.clone(),
        filter: filter.clone(),
    });
    rpc.start(callback_target);

    guard.rpc = Some(rpc);
    guard.writer = Some(writer);
    guard.filter = Some(filter);
    guard.message_received = false;
    guard.state = StreamState::Open;
    let delegate = guard.delegate.clone();
    drop(guard);

    tracing::debug!(path = P::PATH, "stream open");
    if let Some(delegate) = delegate {
        core.lock().unwrap().spec.deliver_open(&delegate);
    }
}

fn handle_mark_idle<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>) {
    let mut guard = core.lock().unwrap();
    guard.queue.verify_is_current_queue();
    if guard.state != StreamState::Open {
        return;
    }
    guard.idle = true;
    if let Some(task) = guard.idle_task.take() {
        task.cancel();
    }
    let idle_duration = guard.idle_duration;
    let queue = guard.queue.clone();
    let core_for_timer = core.clone();
    let task = queue.dispatch_after(idle_duration, move || fire_idle(&core_for_timer));
    guard.idle_task = Some(task);
}

fn fire_idle<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>) {
    let still_idle = {
        let guard = core.lock().unwrap();
        guard.queue.verify_is_current_queue();
        guard.state == StreamState::Open && guard.idle
    };
    if still_idle {
        tracing::debug!("closing idle stream");
        close(core, StreamState::Initial, None);
    }
}

fn handle_inbound<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>, bytes: Bytes) {
    let decoded = {
        let guard = core.lock().unwrap();
        guard.queue.verify_is_current_queue();
        if !guard.state.is_open() {
            return;
        }
        guard.spec.decode(bytes)
    };

    match decoded {
        Ok(message) => {
            let mut guard = core.lock().unwrap();
            if !guard.state.is_open() {
                return;
            }
            guard.backoff.reset();
            if !guard.message_received {
                guard.message_received = true;
                if let Some(rpc) = &guard.rpc {
                    if let Some(response_headers) = rpc.response_headers() {
                        for (name, value) in headers::loggable_response_headers(&response_headers) {
                            tracing::debug!(header = name, value = %value, "response header");
                        }
                    }
                }
            }
            let delegate = guard
                .delegate
                .clone()
                .expect("delegate is set while the stream can receive frames");
            guard.spec.deliver_message(&delegate, message);
        }
        Err(err) => {
            tracing::debug!(error = %err, "failed to decode inbound frame");
            let mut guard = core.lock().unwrap();
            if let Some(rpc) = guard.rpc.as_mut() {
                rpc.finish_with_error(Some(Error::rpc(Status::new(Code::Internal, err.to_string()))));
            }
        }
    }
}

fn handle_transport_closed<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>, err: Option<Error>) {
    let stopped = {
        let guard = core.lock().unwrap();
        guard.queue.verify_is_current_queue();
        guard.state == StreamState::Stopped
    };
    if stopped {
        return;
    }
    close(core, StreamState::Error, err);
}

fn close<P: StreamSpec>(core: &Arc<Mutex<StreamCore<P>>>, final_state: StreamState, err: Option<Error>) {
    let mut guard = core.lock().unwrap();
    if guard.state == StreamState::Stopped {
        return;
    }

    if let Some(task) = guard.idle_task.take() {
        task.cancel();
    }
    guard.idle = false;

    if final_state != StreamState::Error {
        guard.backoff.reset();
    }
    if let Some(err) = &err {
        if status_code(err) == Code::ResourceExhausted {
            guard.backoff.reset_to_max();
        }
    }

    guard.state = final_state;

    if let Some(mut rpc) = guard.rpc.take() {
        if final_state != StreamState::Error {
            rpc.finish_with_error(None);
        }
    }
    guard.writer = None;
    guard.message_received = false;

    let fire_delegate = if final_state != StreamState::Stopped {
        guard.delegate.clone()
    } else {
        None
    };

    if let Some(filter) = guard.filter.take() {
        filter.disable();
    }
    guard.delegate = None;

    drop(guard);

    tracing::debug!(?final_state, "stream closed");

    if let Some(delegate) = fire_delegate {
        core.lock().unwrap().spec.deliver_close(&delegate, err);
    }
}

/// Bridges the abstract [`CallbackTarget`] the transport drives (possibly
/// from a foreign thread) back onto this stream's worker queue.
///
/// Holds the stream weakly: once the last [`Stream`] handle is dropped, the
/// transport's callbacks silently become no-ops rather than keeping the
/// stream's state alive (§9, weak delegate / cyclic back-edge).
struct StreamCallbackTarget<P: StreamSpec> {
    core: Weak<Mutex<StreamCore<P>>>,
    queue: WorkerQueue,
    filter: CallbackFilter,
}

impl<P: StreamSpec> CallbackTarget for StreamCallbackTarget<P> {
    fn write_value(&self, bytes: Bytes) {
        if !self.filter.is_passthrough() {
            return;
        }
        let core = self.core.clone();
        self.queue.dispatch_async_allowing_same_queue(move || {
            if let Some(core) = core.upgrade() {
                handle_inbound(&core, bytes);
            }
        });
    }

    fn writes_finished_with_error(&self, err: Option<Error>) {
        if !self.filter.is_passthrough() {
            return;
        }
        let core = self.core.clone();
        self.queue.dispatch_async_allowing_same_queue(move || {
            if let Some(core) = core.upgrade() {
                handle_transport_closed(&core, err);
            }
        });
    }
}
