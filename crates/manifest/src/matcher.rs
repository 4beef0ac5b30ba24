use crate::{RouteManifest, RouteMatcher};
use routefog_protocol::{paths, RouteRecord};
use std::collections::HashMap;

/// Minimal path matcher over the manifest's parent/segment structure.
///
/// Supports static segments, `:param` dynamic segments, a trailing `*`
/// splat, pathless layout routes and index routes. Every route in the tree
/// is matchable on its own accumulated path; the most specific matching
/// branch wins (static beats dynamic beats splat, index beats its bare
/// parent). This is the server's matcher for patch computation — the
/// client router's own matcher stays an external capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentMatcher;

struct Branch {
    ids: Vec<String>,
    pattern: Vec<String>,
    index: bool,
}

impl RouteMatcher for SegmentMatcher {
    fn match_path(&self, manifest: &RouteManifest, path: &str) -> Vec<String> {
        let normalized = paths::normalize(path);
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

        let mut best: Option<(i64, usize, Vec<String>)> = None;
        for branch in branches(manifest) {
            let Some(mut score) = score_match(&branch.pattern, &segments) else {
                continue;
            };
            if branch.index {
                score += 2;
            }
            let better = match &best {
                None => true,
                Some((s, len, _)) => score > *s || (score == *s && branch.ids.len() > *len),
            };
            if better {
                best = Some((score, branch.ids.len(), branch.ids));
            }
        }
        best.map(|(_, _, ids)| ids).unwrap_or_default()
    }
}

fn branches(manifest: &RouteManifest) -> Vec<Branch> {
    let mut children: HashMap<Option<&str>, Vec<&RouteRecord>> = HashMap::new();
    for record in manifest.routes.values() {
        children
            .entry(record.parent_id.as_deref())
            .or_default()
            .push(record);
    }
    for kids in children.values_mut() {
        kids.sort_by(|a, b| a.id.cmp(&b.id));
    }

    let mut out = Vec::new();
    if let Some(roots) = children.get(&None) {
        for root in roots.clone() {
            collect(root, &children, &mut Vec::new(), &mut Vec::new(), &mut out);
        }
    }
    out
}

fn collect(
    record: &RouteRecord,
    children: &HashMap<Option<&str>, Vec<&RouteRecord>>,
    chain: &mut Vec<String>,
    pattern: &mut Vec<String>,
    out: &mut Vec<Branch>,
) {
    // A parent cycle in a malformed table would otherwise recurse forever.
    if chain.iter().any(|id| id == &record.id) {
        return;
    }
    chain.push(record.id.clone());
    let added = match record.path.as_deref() {
        Some(p) => {
            let segs: Vec<String> = p
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            let n = segs.len();
            pattern.extend(segs);
            n
        }
        None => 0,
    };

    out.push(Branch {
        ids: chain.clone(),
        pattern: pattern.clone(),
        index: record.index,
    });

    if let Some(kids) = children.get(&Some(record.id.as_str())) {
        for kid in kids {
            collect(kid, children, chain, pattern, out);
        }
    }

    chain.pop();
    pattern.truncate(pattern.len() - added);
}

fn score_match(pattern: &[String], segments: &[&str]) -> Option<i64> {
    let splat = pattern.last().is_some_and(|s| s == "*");
    let fixed = if splat {
        &pattern[..pattern.len() - 1]
    } else {
        pattern
    };
    if splat {
        if segments.len() < fixed.len() {
            return None;
        }
    } else if segments.len() != fixed.len() {
        return None;
    }

    let mut score = 0i64;
    for (pat, seg) in fixed.iter().zip(segments) {
        if pat.starts_with(':') {
            score += 3;
        } else if pat == seg {
            score += 10;
        } else {
            return None;
        }
    }
    if splat {
        score += 1;
    }
    Some(score)
}
