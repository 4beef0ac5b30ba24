use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Tracks which paths the client has already settled.
///
/// `pending` holds candidates discovered on the page but not yet sent to
/// the server. `resolved` and `unmatchable` are append-only negative and
/// positive caches: once a path lands in either, it never moves again and
/// never triggers another request. A path is in at most one of the two.
#[derive(Debug, Default)]
pub struct PathKnowledge {
    inner: Mutex<KnowledgeSets>,
}

#[derive(Debug, Default)]
struct KnowledgeSets {
    pending: HashSet<String>,
    resolved: HashSet<String>,
    unmatchable: HashSet<String>,
}

impl PathKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    fn sets(&self) -> MutexGuard<'_, KnowledgeSets> {
        // Mutations are purely additive set inserts/removes, so the data is
        // intact even if a previous holder panicked mid-update.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a candidate unless the path is already settled.
    pub fn register_candidate(&self, path: &str) {
        let mut sets = self.sets();
        if sets.resolved.contains(path) || sets.unmatchable.contains(path) {
            return;
        }
        sets.pending.insert(path.to_string());
    }

    /// Drop a candidate that left the page before it was fetched. Settled
    /// paths are unaffected.
    pub fn deregister_candidate(&self, path: &str) {
        self.sets().pending.remove(path);
    }

    /// Take every pending path that is still unsettled.
    ///
    /// Entries that settled after being registered are filtered out here
    /// rather than eagerly on mark.
    pub fn drain_pending(&self) -> Vec<String> {
        let mut sets = self.sets();
        let drained: Vec<String> = sets.pending.drain().collect();
        drained
            .into_iter()
            .filter(|p| !sets.resolved.contains(p) && !sets.unmatchable.contains(p))
            .collect()
    }

    /// Forget every queued candidate (size-guard fallback: accumulation
    /// restarts cleanly and cleared paths resolve at click time).
    pub fn clear_pending(&self) {
        self.sets().pending.clear();
    }

    /// Record paths the client can now match. Idempotent; paths already
    /// confirmed unmatchable stay unmatchable.
    pub fn mark_resolved<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sets = self.sets();
        for path in paths {
            let path = path.into();
            if sets.unmatchable.contains(&path) {
                continue;
            }
            sets.pending.remove(&path);
            sets.resolved.insert(path);
        }
    }

    /// Record paths the server confirmed match no route. Idempotent; paths
    /// already resolved stay resolved.
    pub fn mark_unmatchable<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sets = self.sets();
        for path in paths {
            let path = path.into();
            if sets.resolved.contains(&path) {
                continue;
            }
            sets.pending.remove(&path);
            sets.unmatchable.insert(path);
        }
    }

    /// True once the path is known good or known bad; the fast path for
    /// repeated navigation attempts.
    pub fn is_settled(&self, path: &str) -> bool {
        let sets = self.sets();
        sets.resolved.contains(path) || sets.unmatchable.contains(path)
    }

    pub fn pending_len(&self) -> usize {
        self.sets().pending.len()
    }
}
