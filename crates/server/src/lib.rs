//! The `__manifest` endpoint: computes route-table patches for requested
//! paths from a full server-side manifest.
//!
//! `GET /__manifest?version=<token>&p=<path>&p=<path>...` answers with a
//! [`ManifestPatch`] scoped to the requested paths and their structurally
//! required ancestors (pathless and index routes included). Unmatched
//! paths land in `notFoundPaths` so clients can cache the negative
//! result permanently.

use anyhow::Context;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use log::debug;
use routefog_manifest::{narrow_initial_manifest, RouteManifest, RouteMatcher, SegmentMatcher};
use routefog_protocol::{ManifestPatch, MANIFEST_ENDPOINT};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Serves patches computed from a full route manifest.
#[derive(Clone)]
pub struct ManifestService {
    manifest: Arc<RouteManifest>,
    matcher: SegmentMatcher,
}

impl ManifestService {
    pub fn new(manifest: RouteManifest) -> Self {
        Self {
            manifest: Arc::new(manifest),
            matcher: SegmentMatcher,
        }
    }

    /// Patch computation shared by the HTTP handler and tests.
    ///
    /// A stale client version token only means the response may carry
    /// records the client already holds; the client-side merge skips
    /// known ids, so no version negotiation is needed here.
    pub fn compute_patch(&self, paths: &[String]) -> ManifestPatch {
        let mut payload = ManifestPatch::default();
        let mut ids: HashSet<String> = HashSet::new();

        for path in paths {
            if self.matcher.match_path(&self.manifest, path).is_empty() {
                payload.not_found_paths.push(path.clone());
                continue;
            }
            let narrowed = narrow_initial_manifest(&self.manifest, &self.matcher, path);
            ids.extend(narrowed.routes.into_keys());
        }

        for id in ids {
            if let Some(record) = self.manifest.get(&id) {
                payload.patches.insert(id, record.clone());
            }
        }
        payload
    }
}

/// The manifest endpoint mounted at `/__manifest`.
pub fn router(service: ManifestService) -> Router {
    Router::new()
        .route(&format!("/{MANIFEST_ENDPOINT}"), get(manifest_handler))
        .with_state(service)
}

async fn manifest_handler(
    State(service): State<ManifestService>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ManifestPatch>, (StatusCode, String)> {
    let raw = raw.unwrap_or_default();
    let mut version = String::new();
    let mut paths: Vec<String> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "version" => version = value.into_owned(),
            "p" => paths.push(value.into_owned()),
            _ => {}
        }
    }

    if paths.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "missing p parameter".to_string()));
    }

    debug!(
        "manifest request: version={version} paths={}",
        paths.len()
    );
    Ok(Json(service.compute_patch(&paths)))
}

/// Load a manifest from a JSON file in the shape `RouteManifest`
/// serializes (`{ "version": ..., "routes": { "<id>": RouteRecord } }`).
pub fn load_manifest(path: &Path) -> anyhow::Result<RouteManifest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read route manifest {}", path.display()))?;
    serde_json::from_str(&raw).context("parse route manifest")
}

#[cfg(test)]
mod tests {
    use super::{load_manifest, ManifestService};
    use routefog_manifest::RouteManifest;
    use routefog_protocol::RouteRecord;

    fn route(id: &str, parent: Option<&str>, path: Option<&str>, index: bool) -> RouteRecord {
        RouteRecord {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            path: path.map(str::to_string),
            index,
            module: None,
        }
    }

    fn service() -> ManifestService {
        ManifestService::new(RouteManifest::with_routes(
            "v1",
            [
                route("a", None, Some("a"), false),
                route("a-index", Some("a"), None, true),
                route("a-b", Some("a"), Some("b"), false),
                route("z", None, Some("z"), false),
            ],
        ))
    }

    #[test]
    fn patch_covers_requested_chains_and_flags_misses() {
        let payload = service().compute_patch(&["/a/b".to_string(), "/nope".to_string()]);

        assert_eq!(payload.not_found_paths, vec!["/nope"]);
        for id in ["a", "a-b", "a-index"] {
            assert!(payload.patches.contains_key(id), "missing {id}");
        }
        assert!(!payload.patches.contains_key("z"));
    }

    #[test]
    fn load_manifest_round_trips_serialized_form() {
        let manifest = RouteManifest::with_routes("v3", [route("a", None, Some("a"), false)]);
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("routes.json");
        std::fs::write(&file, serde_json::to_string(&manifest).unwrap()).unwrap();

        let loaded = load_manifest(&file).unwrap();
        assert_eq!(loaded.version, "v3");
        assert!(loaded.contains("a"));
    }

    #[test]
    fn load_manifest_reports_missing_file() {
        let err = load_manifest(std::path::Path::new("/no/such/file.json")).unwrap_err();
        assert!(err.to_string().contains("read route manifest"));
    }
}
