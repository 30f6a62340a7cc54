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

//! Shared test doubles for the integration scenarios in `tests/`.

pub mod serializer;
pub mod transport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use firestore_mobile_gax::{Error, Result};
use firestore_mobile_transport::credentials::{CredentialsProvider, GetTokenResult};
use firestore_mobile_streaming::backoff::BackoffConfig;
use firestore_mobile_streaming::database_info::DatabaseInfo;
use firestore_mobile_streaming::datastore::Datastore;
use firestore_mobile_transport::WorkerQueue;

pub use serializer::FakeSerializer;
pub use transport::FakeTransport;

/// A credentials provider that always resolves to the same fixed token.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub &'static str);

impl CredentialsProvider for StaticCredentials {
    async fn get_token(&self, _force_refresh: bool) -> Result<GetTokenResult> {
        Ok(GetTokenResult::new(self.0))
    }
}

/// A credentials provider that fails its next `get_token` call on demand,
/// then reverts to succeeding, for tests injecting an auth failure into an
/// otherwise-healthy start/retry sequence.
#[derive(Debug, Clone, Default)]
pub struct FlakyCredentials {
    fail_next: Arc<AtomicBool>,
}

impl FlakyCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `get_token` call fails; every call after that succeeds
    /// again until this is called once more.
    pub fn fail_next_token(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl CredentialsProvider for FlakyCredentials {
    async fn get_token(&self, _force_refresh: bool) -> Result<GetTokenResult> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::authentication("injected auth failure"));
        }
        Ok(GetTokenResult::new("test-token"))
    }
}

/// Bundles everything one scenario test needs: a worker queue, a fake
/// transport a test can drive directly, and a datastore wired to both.
pub struct Harness {
    pub queue: WorkerQueue,
    pub transport: FakeTransport,
    pub datastore: Datastore,
}

pub fn harness() -> Harness {
    harness_with_credentials(Arc::new(StaticCredentials("test-token")), BackoffConfig::default())
}

/// Like [`harness`], but lets a test supply its own credentials provider
/// (e.g. [`FlakyCredentials`], to inject auth failures) and backoff
/// configuration (e.g. a short initial delay, to keep a virtual-time test's
/// advances small).
pub fn harness_with_credentials(
    credentials: Arc<dyn firestore_mobile_transport::credentials::dynamic::CredentialsProvider>,
    backoff_config: BackoffConfig,
) -> Harness {
    let queue = WorkerQueue::new();
    let transport = FakeTransport::new();
    let database_info = Arc::new(
        DatabaseInfo::builder("test-project", "(default)")
            .build()
            .expect("fixed test values are always valid"),
    );
    let datastore = Datastore::with_backoff_config(
        queue.clone(),
        Arc::new(transport.clone()),
        credentials,
        database_info,
        Arc::new(FakeSerializer),
        backoff_config,
    );
    Harness { queue, transport, datastore }
}

/// Runs `f` on the harness's worker queue and waits for every job enqueued
/// as a consequence (directly or transitively) to drain, by yielding to the
/// Tokio scheduler a handful of times.
///
/// The streaming client core has no synchronous "flush" operation by
/// design (§5 — nothing blocks); tests stand in for "wait for the queue to
/// quiesce" with cooperative yields instead.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
