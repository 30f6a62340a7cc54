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

//! Stream base state machine (§4.4) and its two concrete specializations
//! (§4.5, §4.6).

mod base;
mod state;
pub mod watch;
pub mod write;

pub use base::{StreamSpec, DEFAULT_IDLE_DURATION};
pub use state::StreamState;
