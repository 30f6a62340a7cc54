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

use super::Code;

/// A status reported by a remote peer: a [`Code`] plus a human-readable
/// message.
///
/// This deliberately does not model the `google.rpc.Status` `details` field
/// of the full gRPC status proto: the streaming client core only needs the
/// code and message to classify and propagate errors (§7), and richer detail
/// payloads are a concern of the abstract `Serializer`, not this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let status = Status::new(Code::Unavailable, "backend down");
        let rendered = status.to_string();
        assert!(rendered.contains("UNAVAILABLE"));
        assert!(rendered.contains("backend down"));
    }
}
