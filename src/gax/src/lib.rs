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

//! Shared error types and gRPC status taxonomy for the streaming client core.
//!
//! This crate has no knowledge of transports, streams, or the worker queue;
//! it only defines the vocabulary other crates in the workspace use to talk
//! about failures: an [`Error`] with a coarse [`ErrorKind`], and the
//! [`Code`]/[`Status`] pair mirroring the standard gRPC status codes.

pub mod error;

pub use error::{Code, Error, ErrorKind, Status};

/// A `Result` alias using this crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
