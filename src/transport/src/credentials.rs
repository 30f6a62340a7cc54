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

//! The abstract token source.
//!
//! The streaming client core never acquires credentials itself; it asks a
//! [`CredentialsProvider`] for a token before authenticating each stream
//! attempt or unary call. Concrete OAuth implementations live outside this
//! crate.

use std::time::Instant;

use firestore_mobile_gax::Result;

/// The result of a token request.
///
/// The token string may be empty, in which case callers omit the
/// `Authorization` header entirely rather than sending an empty bearer
/// token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetTokenResult {
    pub token: String,
    pub requested_at: Instant,
}

impl GetTokenResult {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            requested_at: Instant::now(),
        }
    }
}

/// An ergonomic, non-dyn-compatible trait for implementing a credentials
/// source. Implementers write ordinary `async fn`s; the dyn-compatible
/// [`dynamic::CredentialsProvider`] used internally by the stream is derived
/// automatically via the blanket impl below.
pub trait CredentialsProvider: Send + Sync {
    /// Requests a token. `force_refresh` is always `false` in the current
    /// core (see the open question in the design notes about refreshing
    /// after a prior auth failure); the parameter is exposed so a future
    /// caller can opt in without changing the trait.
    fn get_token(&self, force_refresh: bool) -> impl Future<Output = Result<GetTokenResult>> + Send;
}

pub mod dynamic {
    use super::*;

    /// The dyn-compatible counterpart of [`super::CredentialsProvider`],
    /// used anywhere the stream needs to hold a type-erased credentials
    /// source (`Arc<dyn CredentialsProvider>`).
    #[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
    #[async_trait::async_trait]
    pub trait CredentialsProvider: Send + Sync + std::fmt::Debug {
        async fn get_token(&self, force_refresh: bool) -> Result<GetTokenResult>;
    }

    #[async_trait::async_trait]
    impl<T> CredentialsProvider for T
    where
        T: super::CredentialsProvider + std::fmt::Debug,
    {
        async fn get_token(&self, force_refresh: bool) -> Result<GetTokenResult> {
            super::CredentialsProvider::get_token(self, force_refresh).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug)]
    struct StaticToken(&'static str);

    impl CredentialsProvider for StaticToken {
        async fn get_token(&self, _force_refresh: bool) -> Result<GetTokenResult> {
            Ok(GetTokenResult::new(self.0))
        }
    }

    #[tokio::test]
    async fn blanket_impl_makes_it_dyn_compatible() {
        let provider: Arc<dyn dynamic::CredentialsProvider> = Arc::new(StaticToken("tok"));
        let got = dynamic::CredentialsProvider::get_token(provider.as_ref(), false)
            .await
            .unwrap();
        assert_eq!(got.token, "tok");
    }
}
