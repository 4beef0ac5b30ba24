//! Wire protocol shared by the routefog client and server.
//!
//! The manifest endpoint speaks JSON over a single GET:
//!
//! ```text
//! GET <base>/__manifest?version=<token>&p=<path>&p=<path>...
//!
//! 200 -> { "notFoundPaths": ["/missing"], "patches": { "<routeId>": RouteRecord } }
//! ```
//!
//! Repeated `p` parameters keep caller order. Any status >= 400 is a
//! failure regardless of the body.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

pub mod paths;

/// Well-known sub-path of the manifest endpoint, relative to the router
/// basename.
pub const MANIFEST_ENDPOINT: &str = "__manifest";

/// Longest request URL the client will issue. Chosen to stay under common
/// browser/proxy GET-URL limits with margin; an oversized batch is skipped
/// rather than split.
pub const MAX_MANIFEST_URL_LEN: usize = 7680;

/// A single route definition as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub id: String,

    /// Parent route id; `None` for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// The route's own path segment(s). Pathless layout routes carry `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Index routes match their parent's path exactly and add no segment.
    #[serde(default)]
    pub index: bool,

    /// Opaque module reference resolved by the client-side loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

/// Server response: exactly the routes newly needed to resolve the
/// requested paths, plus the paths the server knows match nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPatch {
    #[serde(default)]
    pub not_found_paths: Vec<String>,

    #[serde(default)]
    pub patches: HashMap<String, RouteRecord>,
}

impl ManifestPatch {
    pub fn is_empty(&self) -> bool {
        self.not_found_paths.is_empty() && self.patches.is_empty()
    }
}

/// The encoded request URL would exceed [`MAX_MANIFEST_URL_LEN`].
///
/// Not a failure: the caller degrades to click-time resolution instead of
/// issuing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("encoded manifest URL exceeds {MAX_MANIFEST_URL_LEN} characters")]
pub struct UrlOverflow;

/// Build the manifest request URL for a batch of candidate paths.
///
/// The `version` parameter comes first, then one `p` parameter per
/// candidate in input order.
pub fn manifest_request_url(
    base: &Url,
    version: &str,
    candidates: &[String],
) -> Result<Url, UrlOverflow> {
    let mut url = base.clone();
    {
        let mut path = url.path().trim_end_matches('/').to_string();
        path.push('/');
        path.push_str(MANIFEST_ENDPOINT);
        url.set_path(&path);
    }
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair("version", version);
        for candidate in candidates {
            query.append_pair("p", candidate);
        }
    }
    if url.as_str().len() > MAX_MANIFEST_URL_LEN {
        return Err(UrlOverflow);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://app.example.com").unwrap()
    }

    #[test]
    fn url_keeps_candidate_order() {
        let paths = vec!["/b".to_string(), "/a".to_string(), "/c/d".to_string()];
        let url = manifest_request_url(&base(), "v1", &paths).unwrap();
        assert_eq!(url.path(), "/__manifest");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("version".to_string(), "v1".to_string()),
                ("p".to_string(), "/b".to_string()),
                ("p".to_string(), "/a".to_string()),
                ("p".to_string(), "/c/d".to_string()),
            ]
        );
    }

    #[test]
    fn url_respects_base_path_prefix() {
        let base = Url::parse("https://app.example.com/admin/").unwrap();
        let url = manifest_request_url(&base, "v1", &["/x".to_string()]).unwrap();
        assert_eq!(url.path(), "/admin/__manifest");
    }

    #[test]
    fn overflow_triggers_exactly_past_the_limit() {
        // Find the length contribution of the fixed parts, then pin the
        // boundary without hardcoding encoder details.
        let probe = manifest_request_url(&base(), "v", &["/".to_string()]).unwrap();
        let overhead = probe.as_str().len() - "%2F".len();

        let fits = "a".repeat(MAX_MANIFEST_URL_LEN - overhead - "%2F".len());
        let path = format!("/{fits}");
        let url = manifest_request_url(&base(), "v", &[path.clone()]).unwrap();
        assert_eq!(url.as_str().len(), MAX_MANIFEST_URL_LEN);

        let too_long = format!("{path}a");
        assert_eq!(
            manifest_request_url(&base(), "v", &[too_long]),
            Err(UrlOverflow)
        );
    }

    #[test]
    fn patch_payload_wire_shape() {
        let raw = r#"{
            "notFoundPaths": ["/missing"],
            "patches": {
                "routes/a": {
                    "id": "routes/a",
                    "parentId": "root",
                    "path": "a",
                    "index": false,
                    "module": "routes/a.js"
                }
            }
        }"#;
        let patch: ManifestPatch = serde_json::from_str(raw).unwrap();
        assert_eq!(patch.not_found_paths, vec!["/missing"]);
        let record = &patch.patches["routes/a"];
        assert_eq!(record.parent_id.as_deref(), Some("root"));
        assert_eq!(record.path.as_deref(), Some("a"));

        let round = serde_json::to_value(&patch).unwrap();
        assert!(round["patches"]["routes/a"]["parentId"].is_string());
    }

    #[test]
    fn index_defaults_to_false_when_absent() {
        let record: RouteRecord = serde_json::from_str(r#"{"id":"r"}"#).unwrap();
        assert!(!record.index);
        assert!(record.parent_id.is_none());
    }
}
