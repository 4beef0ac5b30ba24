use routefog_protocol::RouteRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The client-held route table: route id -> definition, plus the version
/// token of the build it came from.
///
/// Entries are only ever added. Readers may observe a merge in progress;
/// that is safe precisely because nothing is removed or rewritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteManifest {
    pub version: String,
    pub routes: HashMap<String, RouteRecord>,
}

impl RouteManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            routes: HashMap::new(),
        }
    }

    pub fn with_routes<I>(version: impl Into<String>, routes: I) -> Self
    where
        I: IntoIterator<Item = RouteRecord>,
    {
        let mut manifest = Self::new(version);
        for record in routes {
            manifest.insert(record);
        }
        manifest
    }

    pub fn contains(&self, id: &str) -> bool {
        self.routes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&RouteRecord> {
        self.routes.get(id)
    }

    /// Add a record unless its id is already known. First write wins: a
    /// later overlapping patch must not clobber a route the tree already
    /// materialized.
    pub fn insert(&mut self, record: RouteRecord) -> bool {
        if self.routes.contains_key(&record.id) {
            return false;
        }
        self.routes.insert(record.id.clone(), record);
        true
    }

    /// A copy restricted to the given route ids (initial-manifest
    /// narrowing).
    pub fn restrict(&self, ids: &HashSet<String>) -> RouteManifest {
        RouteManifest {
            version: self.version.clone(),
            routes: self
                .routes
                .iter()
                .filter(|(id, _)| ids.contains(*id))
                .map(|(id, record)| (id.clone(), record.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
