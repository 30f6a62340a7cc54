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

//! `DatabaseInfo` (§3): the crate's process-lifetime configuration entity.
//!
//! A small, validated, immutable struct built through a builder, mirroring
//! the corpus's pattern of narrow configuration types rather than a single
//! sprawling options bag.

use firestore_mobile_gax::{Error, Result};
use firestore_mobile_transport::Endpoint;

/// The production Firestore host used when a builder does not override it.
pub const DEFAULT_HOST: &str = "firestore.googleapis.com";

/// Identifies one Firestore database and how to reach it.
///
/// `persistence_key` disambiguates the on-device cache directory when a
/// process opens more than one database; the streaming client core does not
/// read or write that cache itself (§1, out of scope) but carries the key so
/// callers building the local store on top of this crate have it to hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseInfo {
    project_id: String,
    database_id: String,
    host: String,
    ssl_enabled: bool,
    persistence_key: String,
}

impl DatabaseInfo {
    pub fn builder(project_id: impl Into<String>, database_id: impl Into<String>) -> DatabaseInfoBuilder {
        DatabaseInfoBuilder::new(project_id, database_id)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ssl_enabled(&self) -> bool {
        self.ssl_enabled
    }

    pub fn persistence_key(&self) -> &str {
        &self.persistence_key
    }

    /// The `google-cloud-resource-prefix` value for this database (§6).
    pub fn resource_prefix(&self) -> String {
        firestore_mobile_transport::headers::resource_prefix_value(&self.project_id, &self.database_id)
    }

    /// The transport endpoint this database is reached through.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.host.clone(),
            ssl_enabled: self.ssl_enabled,
        }
    }
}

/// Builds a [`DatabaseInfo`], defaulting to the production Firestore host
/// over TLS and a persistence key equal to the project id.
#[derive(Clone, Debug)]
pub struct DatabaseInfoBuilder {
    project_id: String,
    database_id: String,
    host: String,
    ssl_enabled: bool,
    persistence_key: Option<String>,
}

impl DatabaseInfoBuilder {
    pub fn new(project_id: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: database_id.into(),
            host: DEFAULT_HOST.to_string(),
            ssl_enabled: true,
            persistence_key: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_ssl_enabled(mut self, ssl_enabled: bool) -> Self {
        self.ssl_enabled = ssl_enabled;
        self
    }

    pub fn with_persistence_key(mut self, key: impl Into<String>) -> Self {
        self.persistence_key = Some(key.into());
        self
    }

    pub fn build(self) -> Result<DatabaseInfo> {
        if self.project_id.is_empty() {
            return Err(Error::other("project_id must not be empty"));
        }
        if self.database_id.is_empty() {
            return Err(Error::other("database_id must not be empty"));
        }
        if self.host.is_empty() {
            return Err(Error::other("host must not be empty"));
        }
        let persistence_key = self.persistence_key.unwrap_or_else(|| self.project_id.clone());
        Ok(DatabaseInfo {
            project_id: self.project_id,
            database_id: self.database_id,
            host: self.host,
            ssl_enabled: self.ssl_enabled,
            persistence_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production_host_over_tls() {
        let info = DatabaseInfo::builder("my-project", "(default)").build().unwrap();
        assert_eq!(info.host(), DEFAULT_HOST);
        assert!(info.ssl_enabled());
        assert_eq!(info.persistence_key(), "my-project");
    }

    #[test]
    fn resource_prefix_matches_project_and_database() {
        let info = DatabaseInfo::builder("my-project", "(default)").build().unwrap();
        assert_eq!(info.resource_prefix(), "projects/my-project/databases/(default)");
    }

    #[test]
    fn rejects_empty_project_id() {
        assert!(DatabaseInfo::builder("", "(default)").build().is_err());
    }

    #[test]
    fn custom_host_and_persistence_key_are_honored() {
        let info = DatabaseInfo::builder("my-project", "db2")
            .with_host("localhost:8080")
            .with_ssl_enabled(false)
            .with_persistence_key("custom-key")
            .build()
            .unwrap();
        assert_eq!(info.host(), "localhost:8080");
        assert!(!info.ssl_enabled());
        assert_eq!(info.persistence_key(), "custom-key");
    }
}
