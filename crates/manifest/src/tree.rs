use crate::RouteManifest;
use routefog_protocol::RouteRecord;
use thiserror::Error;

/// Error surfaced by the external router when a graft is rejected.
#[derive(Debug, Clone, Error)]
#[error("route tree patch failed: {0}")]
pub struct TreePatchError(pub String);

/// The external router's live route tree, consumed as an abstract
/// capability.
///
/// `build_node` is the router's node-construction function: it turns a raw
/// route record (with its already-built children) into whatever node
/// representation the router uses. `patch_routes` grafts new children under
/// an existing parent; `None` grafts at the root. Patching the same parent
/// twice with disjoint children must be safe.
pub trait RouteTree: Send + Sync {
    type Node: Send;

    fn build_node(&self, record: &RouteRecord, children: Vec<Self::Node>) -> Self::Node;

    fn patch_routes(
        &self,
        parent_id: Option<&str>,
        children: Vec<Self::Node>,
    ) -> Result<(), TreePatchError>;
}

/// The router's path-matching capability, consumed server-side to compute
/// patches and narrow the initial manifest.
pub trait RouteMatcher {
    /// Route ids matched for `path` against `manifest`, root-to-leaf.
    /// Empty when nothing matches.
    fn match_path(&self, manifest: &RouteManifest, path: &str) -> Vec<String>;
}
