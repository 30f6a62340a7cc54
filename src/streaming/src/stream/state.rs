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

//! The six-state stream lifecycle (§4.4.1).

/// Where a [`super::base::Stream`] is in its lifecycle.
///
/// `Initial` is the state at construction; `Stopped` is terminal — a stopped
/// stream is never reused, a caller builds a fresh one instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    Initial,
    Auth,
    Backoff,
    Open,
    Error,
    Stopped,
}

impl StreamState {
    pub fn is_started(self) -> bool {
        matches!(self, StreamState::Backoff | StreamState::Auth | StreamState::Open)
    }

    pub fn is_open(self) -> bool {
        matches!(self, StreamState::Open)
    }
}
