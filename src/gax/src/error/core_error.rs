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

use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error produced by any component in the streaming client core.
///
/// `Error` always carries a [`source`](std::error::Error::source), so the
/// original cause (a transport error, a serde failure, a remote status) is
/// never discarded. [`Error::as_inner`] walks the source chain to recover a
/// concrete type when a caller needs to inspect it.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

impl Error {
    /// Builds an error of the given `kind` wrapping `source`.
    pub fn new<T: Into<BoxError>>(kind: ErrorKind, source: T) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// An error credentials acquisition failed with.
    pub fn authentication<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Authentication, source)
    }

    /// An error produced by the transport (connection, TLS, HTTP/2 framing).
    pub fn transport<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Transport, source)
    }

    /// An error produced while encoding or decoding a wire frame.
    pub fn serde<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Serde, source)
    }

    /// An error carrying a remote [`Status`](super::Status).
    pub fn rpc<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Rpc, source)
    }

    /// An error that does not fit any of the other kinds.
    pub fn other<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Other, source)
    }

    /// The coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind.clone()
    }

    /// Walks the `source()` chain looking for a `T`.
    pub fn as_inner<T: std::error::Error + Send + Sync + 'static>(&self) -> Option<&T> {
        let mut cause: &dyn std::error::Error = self.source.as_ref();
        loop {
            if let Some(found) = cause.downcast_ref::<T>() {
                return Some(found);
            }
            cause = cause.source()?;
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// A coarse classification of where an [`Error`] originated.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ErrorKind {
    /// Encoding or decoding a wire frame failed.
    Serde,
    /// Acquiring or refreshing a credential failed.
    Authentication,
    /// The transport reported a connection-level failure.
    Transport,
    /// The remote peer returned an RPC status.
    Rpc,
    /// Anything not covered by the other kinds.
    #[default]
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Serde => "serde",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Transport => "transport",
            ErrorKind::Rpc => "rpc",
            ErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[derive(thiserror::Error, Debug)]
    #[error("inner failure")]
    struct Inner;

    #[test_case(ErrorKind::Serde, "serde")]
    #[test_case(ErrorKind::Authentication, "authentication")]
    #[test_case(ErrorKind::Transport, "transport")]
    #[test_case(ErrorKind::Rpc, "rpc")]
    #[test_case(ErrorKind::Other, "other")]
    fn kind_display(kind: ErrorKind, want: &str) {
        assert_eq!(kind.to_string(), want);
    }

    #[test]
    fn display_includes_kind_and_source() {
        let err = Error::transport(Inner);
        let msg = err.to_string();
        assert!(msg.contains("transport"), "{msg}");
        assert!(msg.contains("inner failure"), "{msg}");
    }

    #[test]
    fn as_inner_finds_wrapped_type() {
        let err = Error::authentication(Inner);
        assert!(err.as_inner::<Inner>().is_some());
        assert!(err.as_inner::<std::fmt::Error>().is_none());
    }

    #[test]
    fn kind_is_queryable() {
        let err = Error::rpc(Inner);
        assert_eq!(err.kind(), ErrorKind::Rpc);
    }
}
