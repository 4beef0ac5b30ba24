use crate::{RouteManifest, RouteMatcher};
use routefog_protocol::paths;
use std::collections::HashSet;

/// Compute the minimal manifest a server should embed for an initial
/// render of `request_path`.
///
/// Matching only the full leaf path misses pathless and index routes that
/// attach to an ancestor segment without adding a segment of their own, so
/// every ancestor prefix is re-matched (stripping one segment at a time up
/// to the root) and the matched route ids unioned.
pub fn narrow_initial_manifest<M: RouteMatcher>(
    full: &RouteManifest,
    matcher: &M,
    request_path: &str,
) -> RouteManifest {
    let normalized = paths::normalize(request_path);
    let mut keep: HashSet<String> = HashSet::new();
    keep.extend(matcher.match_path(full, &normalized));
    for ancestor in paths::ancestors(&normalized) {
        keep.extend(matcher.match_path(full, &ancestor));
    }
    full.restrict(&keep)
}

#[cfg(test)]
mod tests {
    use super::narrow_initial_manifest;
    use crate::{RouteManifest, SegmentMatcher};
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

    /// Deep nested tree for `/a/b/c` where every level hangs an index (or
    /// pathless+index) route off the ancestor segment.
    fn fixture() -> RouteManifest {
        RouteManifest::with_routes(
            "v1",
            [
                route("a", None, Some("a"), false),
                route("a-layout", Some("a"), None, false),
                route("a-layout-index", Some("a-layout"), None, true),
                route("a-b", Some("a"), Some("b"), false),
                route("a-b-index", Some("a-b"), None, true),
                route("a-b-c", Some("a-b"), Some("c"), false),
                route("a-b-c-index", Some("a-b-c"), None, true),
                route("unrelated", None, Some("z"), false),
            ],
        )
    }

    #[test]
    fn deep_path_pulls_in_ancestors_and_their_index_siblings() {
        let narrowed = narrow_initial_manifest(&fixture(), &SegmentMatcher, "/a/b/c");

        for id in [
            "a",
            "a-b",
            "a-b-c",
            "a-b-c-index",
            "a-b-index",
            "a-layout",
            "a-layout-index",
        ] {
            assert!(narrowed.contains(id), "missing {id}");
        }
        assert!(!narrowed.contains("unrelated"));
    }

    #[test]
    fn root_path_narrows_to_nothing_when_unmatched() {
        let narrowed = narrow_initial_manifest(&fixture(), &SegmentMatcher, "/");
        assert!(narrowed.is_empty());
        assert_eq!(narrowed.version, "v1");
    }
}
