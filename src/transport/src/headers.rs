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

//! Header construction for every RPC the streaming client core issues.

use http::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying client/library version telemetry.
pub const X_GOOG_API_CLIENT: &str = "x-goog-api-client";
/// Header scoping a request to a specific project/database pair.
pub const GOOGLE_CLOUD_RESOURCE_PREFIX: &str = "google-cloud-resource-prefix";

/// Response headers that are safe to log (lowercase, exact match).
pub const LOGGABLE_RESPONSE_HEADERS: &[&str] = &[
    "date",
    "x-google-backends",
    "x-google-netmon-label",
    "x-google-service",
    "x-google-gfe-request-trace",
];

/// Builds the static `x-goog-api-client` header value for this client.
///
/// Unlike a generated library, which fills in a gapic/gccl component, a
/// hand-written mobile client only advertises the platform (`gl-objc`, kept
/// for wire compatibility with the service's existing client population),
/// the SDK name and version, and the RPC transport (`grpc`).
pub fn x_goog_api_client_value(sdk_version: &str) -> String {
    format!("gl-objc/ fire/{sdk_version} grpc/")
}

/// Builds the `google-cloud-resource-prefix` header value for a database.
pub fn resource_prefix_value(project_id: &str, database_id: &str) -> String {
    format!("projects/{project_id}/databases/{database_id}")
}

/// Installs the headers required on every RPC: the api-client telemetry
/// header, the resource prefix, and (if `token` is non-empty) the bearer
/// `Authorization` header.
pub fn install_common_headers(
    headers: &mut HeaderMap,
    sdk_version: &str,
    project_id: &str,
    database_id: &str,
    token: &str,
) {
    headers.insert(
        HeaderName::from_static(X_GOOG_API_CLIENT),
        HeaderValue::from_str(&x_goog_api_client_value(sdk_version)).expect("header value is ASCII"),
    );
    headers.insert(
        HeaderName::from_static(GOOGLE_CLOUD_RESOURCE_PREFIX),
        HeaderValue::from_str(&resource_prefix_value(project_id, database_id)).expect("project/database ids are ASCII"),
    );
    if !token.is_empty() {
        let value = format!("Bearer {token}");
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_str(&value).expect("bearer token is ASCII"),
        );
    }
}

/// Extracts the whitelisted, loggable subset of a response's headers.
pub fn loggable_response_headers(headers: &HeaderMap) -> Vec<(&'static str, String)> {
    LOGGABLE_RESPONSE_HEADERS
        .iter()
        .filter_map(|&name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name, v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_client_header_has_expected_shape() {
        assert_eq!(x_goog_api_client_value("10.2.0"), "gl-objc/ fire/10.2.0 grpc/");
    }

    #[test]
    fn resource_prefix_has_expected_shape() {
        assert_eq!(
            resource_prefix_value("proj", "(default)"),
            "projects/proj/databases/(default)"
        );
    }

    #[test]
    fn install_common_headers_omits_auth_when_token_empty() {
        let mut headers = HeaderMap::new();
        install_common_headers(&mut headers, "1.0.0", "proj", "db", "");
        assert!(headers.get(http::header::AUTHORIZATION).is_none());
        assert!(headers.get(X_GOOG_API_CLIENT).is_some());
        assert!(headers.get(GOOGLE_CLOUD_RESOURCE_PREFIX).is_some());
    }

    #[test]
    fn install_common_headers_sets_bearer_token_when_present() {
        let mut headers = HeaderMap::new();
        install_common_headers(&mut headers, "1.0.0", "proj", "db", "abc123");
        assert_eq!(
            headers.get(http::header::AUTHORIZATION).unwrap(),
            "Bearer abc123"
        );
    }

    #[test]
    fn loggable_response_headers_filters_to_whitelist() {
        let mut headers = HeaderMap::new();
        headers.insert("date", HeaderValue::from_static("today"));
        headers.insert("x-secret-internal", HeaderValue::from_static("nope"));
        let got = loggable_response_headers(&headers);
        assert_eq!(got, vec![("date", "today".to_string())]);
    }
}
