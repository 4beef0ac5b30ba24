use crate::{FetchOutcome, PatchSource, Result};
use log::{debug, info};
use routefog_manifest::{merge_patch, PathKnowledge, RouteManifest, RouteTree};
use std::sync::{Arc, Mutex, PoisonError};

/// Fetch + merge + knowledge update as one operation.
///
/// The protocol component has no side effects of its own; this is the
/// caller that always pairs it with the merge and the knowledge marks, so
/// the combination is atomic from the router's point of view.
pub struct PatchPipeline<T: RouteTree> {
    source: Arc<dyn PatchSource>,
    manifest: Arc<Mutex<RouteManifest>>,
    knowledge: Arc<PathKnowledge>,
    tree: Arc<T>,
}

impl<T: RouteTree> Clone for PatchPipeline<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            manifest: self.manifest.clone(),
            knowledge: self.knowledge.clone(),
            tree: self.tree.clone(),
        }
    }
}

impl<T: RouteTree> PatchPipeline<T> {
    pub fn new(
        source: Arc<dyn PatchSource>,
        manifest: Arc<Mutex<RouteManifest>>,
        knowledge: Arc<PathKnowledge>,
        tree: Arc<T>,
    ) -> Self {
        Self {
            source,
            manifest,
            knowledge,
            tree,
        }
    }

    pub fn knowledge(&self) -> &PathKnowledge {
        &self.knowledge
    }

    pub fn manifest(&self) -> Arc<Mutex<RouteManifest>> {
        self.manifest.clone()
    }

    /// Fetch patches for `paths` and fold them into the manifest.
    ///
    /// Empty input is a no-op. An oversized batch clears the entire
    /// pending set and returns `Ok` — degrade to click-time resolution,
    /// not a failure.
    pub async fn fetch_and_merge(&self, paths: Vec<String>) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let version = {
            let manifest = self.manifest.lock().unwrap_or_else(PoisonError::into_inner);
            manifest.version.clone()
        };

        match self.source.fetch(&paths, &version).await? {
            FetchOutcome::UrlTooLong => {
                info!(
                    "manifest request URL over limit; dropping batch of {} and clearing {} pending path(s)",
                    paths.len(),
                    self.knowledge.pending_len()
                );
                self.knowledge.clear_pending();
                Ok(())
            }
            FetchOutcome::Patch(payload) => {
                let outcome =
                    merge_patch(&self.manifest, &self.knowledge, self.tree.as_ref(), &paths, &payload)?;
                debug!(
                    "merged {} new route(s) across {} graft point(s) for {} requested path(s)",
                    outcome.added,
                    outcome.grafted_parents,
                    paths.len()
                );
                Ok(())
            }
        }
    }

    /// The router's on-miss resolver: called when client-side matching
    /// fails for a navigation target.
    ///
    /// Already-settled paths return immediately without a network call.
    /// Errors propagate to the router's own miss handling.
    pub async fn resolve_miss(&self, path: &str) -> Result<()> {
        if self.knowledge.is_settled(path) {
            return Ok(());
        }
        self.fetch_and_merge(vec![path.to_string()]).await
    }
}
