//! HTTP-level tests for the manifest endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use routefog_manifest::RouteManifest;
use routefog_protocol::{ManifestPatch, RouteRecord};
use routefog_server::{router, ManifestService};
use tower::ServiceExt;

fn route(id: &str, parent: Option<&str>, path: Option<&str>, index: bool) -> RouteRecord {
    RouteRecord {
        id: id.to_string(),
        parent_id: parent.map(str::to_string),
        path: path.map(str::to_string),
        index,
        module: None,
    }
}

fn app() -> axum::Router {
    router(ManifestService::new(RouteManifest::with_routes(
        "v1",
        [
            route("a", None, Some("a"), false),
            route("a-b", Some("a"), Some("b"), false),
            route("a-b-index", Some("a-b"), None, true),
        ],
    )))
}

async fn get_patch(uri: &str) -> (StatusCode, Option<ManifestPatch>) {
    let response = app()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload = serde_json::from_slice(&bytes).ok();
    (status, payload)
}

#[tokio::test]
async fn serves_patches_for_repeated_p_parameters() {
    let (status, payload) = get_patch("/__manifest?version=v1&p=%2Fa%2Fb&p=%2Fmissing").await;

    assert_eq!(status, StatusCode::OK);
    let payload = payload.unwrap();
    assert_eq!(payload.not_found_paths, vec!["/missing"]);
    for id in ["a", "a-b", "a-b-index"] {
        assert!(payload.patches.contains_key(id), "missing {id}");
    }
}

#[tokio::test]
async fn missing_p_parameter_is_a_bad_request() {
    let (status, _) = get_patch("/__manifest?version=v1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_version_token_still_serves_patches() {
    let (status, payload) = get_patch("/__manifest?version=stale&p=%2Fa").await;
    assert_eq!(status, StatusCode::OK);
    assert!(payload.unwrap().patches.contains_key("a"));
}
