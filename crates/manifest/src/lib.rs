//! # Routefog Manifest
//!
//! The client-side view of the route table and the operations that grow it.
//!
//! ```text
//! ManifestPatch (wire)
//!     │
//!     ├──> merge_patch
//!     │      ├─ skip already-known route ids
//!     │      ├─ insert the rest into RouteManifest
//!     │      ├─ settle paths in PathKnowledge
//!     │      └─ graft new subtrees via RouteTree::patch_routes
//!     │
//!     └──> narrow_initial_manifest (server side)
//!            └─ ancestor re-matching for the initial payload
//! ```
//!
//! The manifest only ever grows: entries are created on first patch and
//! never deleted or rewritten.

mod knowledge;
mod manifest;
mod matcher;
mod merge;
mod narrow;
mod tree;

pub use knowledge::PathKnowledge;
pub use manifest::RouteManifest;
pub use matcher::SegmentMatcher;
pub use merge::{merge_patch, MergeOutcome};
pub use narrow::narrow_initial_manifest;
pub use tree::{RouteMatcher, RouteTree, TreePatchError};
