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

//! The error type surfaced across the streaming client core.
//!
//! Errors detected locally (a malformed frame, a credentials failure) are
//! distinguished from errors reported by the remote service (a status code
//! carried on an RPC). Both are represented by the same [`Error`] type so
//! callers have one thing to match on, with [`Error::kind`] telling them
//! which bucket they are in.

mod code;
mod core_error;
mod status;

pub use code::Code;
pub use core_error::{Error, ErrorKind};
pub use status::Status;
