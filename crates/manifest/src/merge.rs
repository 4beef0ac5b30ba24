use crate::{PathKnowledge, RouteManifest, RouteTree, TreePatchError};
use log::debug;
use routefog_protocol::{ManifestPatch, RouteRecord};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

/// Summary of a single merge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Route records newly added to the manifest.
    pub added: usize,
    /// Grafting points handed to the router.
    pub grafted_parents: usize,
}

/// Fold a server patch into the live manifest and graft the new subtrees
/// onto the router's tree.
///
/// Route ids already present before the merge are skipped, so overlapping
/// patches from concurrent requests never clobber a materialized route and
/// replaying a payload is a no-op. Grafting points are exactly the parents
/// of new entries that are not themselves new (or the root for new
/// top-level entries); a new entry whose parent is also new is attached
/// inside its parent's constructed node instead.
///
/// A failed `patch_routes` call propagates, and mutations already applied
/// are not rolled back: the manifest may then hold route definitions that
/// were never grafted, which is benign and never silently re-attempted.
pub fn merge_patch<T: RouteTree>(
    manifest: &Mutex<RouteManifest>,
    knowledge: &PathKnowledge,
    tree: &T,
    requested_paths: &[String],
    payload: &ManifestPatch,
) -> Result<MergeOutcome, TreePatchError> {
    let mut fresh: Vec<RouteRecord> = {
        let mut manifest = manifest.lock().unwrap_or_else(PoisonError::into_inner);
        let known: HashSet<String> = manifest.routes.keys().cloned().collect();
        payload
            .patches
            .values()
            .filter(|record| !known.contains(&record.id))
            .map(|record| {
                manifest.insert((*record).clone());
                (*record).clone()
            })
            .collect()
    };
    fresh.sort_by(|a, b| a.id.cmp(&b.id));

    knowledge.mark_unmatchable(payload.not_found_paths.iter().cloned());
    knowledge.mark_resolved(requested_paths.iter().cloned());

    if fresh.is_empty() {
        return Ok(MergeOutcome::default());
    }

    let new_ids: HashSet<&str> = fresh.iter().map(|r| r.id.as_str()).collect();
    let mut children_of: HashMap<&str, Vec<&RouteRecord>> = HashMap::new();
    let mut graft: BTreeMap<Option<String>, Vec<&RouteRecord>> = BTreeMap::new();
    for record in &fresh {
        match record.parent_id.as_deref() {
            Some(parent) if new_ids.contains(parent) => {
                children_of.entry(parent).or_default().push(record);
            }
            parent => graft
                .entry(parent.map(str::to_string))
                .or_default()
                .push(record),
        }
    }

    let mut grafted_parents = 0usize;
    for (parent, records) in &graft {
        let nodes = records
            .iter()
            .map(|record| assemble(tree, record, &children_of))
            .collect();
        tree.patch_routes(parent.as_deref(), nodes)?;
        grafted_parents += 1;
    }

    debug!(
        "merged {} new route(s) across {} graft point(s)",
        fresh.len(),
        grafted_parents
    );

    Ok(MergeOutcome {
        added: fresh.len(),
        grafted_parents,
    })
}

/// Build a node for `record` with all of its newly-merged descendants
/// nested inside.
fn assemble<T: RouteTree>(
    tree: &T,
    record: &RouteRecord,
    children_of: &HashMap<&str, Vec<&RouteRecord>>,
) -> T::Node {
    let children = children_of
        .get(record.id.as_str())
        .map(|kids| {
            kids.iter()
                .map(|kid| assemble(tree, kid, children_of))
                .collect()
        })
        .unwrap_or_default();
    tree.build_node(record, children)
}
