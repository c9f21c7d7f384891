//! Dependency tracking between source files.
//!
//! The compile worker owns the authoritative graph and records every file's
//! direct imports. The serving side holds a copy rebuilt from the snapshots
//! carried by `dependency_map` sync frames, and only ever asks one question
//! of it: who depends on this file?
//!
//! ```text
//!   Card.component ──▶ { Nav.component }
//!   Nav.component  ──▶ { index.page, about.page }
//! ```
//!
//! Cycles and dangling entries are tolerated; walkers guard with a visited set.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type PathSet = FxHashSet<PathBuf>;
type PathSetMap = FxHashMap<PathBuf, PathSet>;

/// Serialized form: dependency → sorted dependents.
pub type DependencySnapshot = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Bidirectional dependency graph.
///
/// # Invariants
/// - Forward and reverse mappings are always consistent
/// - Self-references are excluded
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Forward: file → the files it imports
    forward: PathSetMap,
    /// Reverse: imported file → files that import it
    reverse: PathSetMap,
}

impl DependencyGraph {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the direct imports of `file`, replacing what was known before.
    pub fn record(&mut self, file: &Path, imports: &[PathBuf]) {
        self.remove_file(file);

        let deps: PathSet = imports
            .iter()
            .filter(|p| p.as_path() != file)
            .cloned()
            .collect();

        for dep in &deps {
            self.reverse
                .entry(dep.clone())
                .or_default()
                .insert(file.to_path_buf());
        }

        self.forward.insert(file.to_path_buf(), deps);
    }

    /// Files that directly import `file`.
    #[inline]
    pub fn dependents(&self, file: &Path) -> Option<&PathSet> {
        self.reverse.get(file)
    }

    /// Whether `file` is imported by anything.
    #[inline]
    pub fn contains(&self, file: &Path) -> bool {
        self.reverse.contains_key(file)
    }

    /// Reverse mapping with deterministic ordering, for the wire.
    pub fn snapshot(&self) -> DependencySnapshot {
        self.reverse
            .iter()
            .map(|(dep, users)| {
                let mut users: Vec<_> = users.iter().cloned().collect();
                users.sort();
                (dep.clone(), users)
            })
            .collect()
    }

    /// Rebuild a graph from a snapshot. Replaces, never merges.
    ///
    /// The snapshot only carries edges, so `forward` comes back partial:
    /// files recorded with no imports have no entry. The serving side only
    /// ever asks for dependents, which round-trip exactly.
    pub fn from_snapshot(snapshot: DependencySnapshot) -> Self {
        let mut graph = Self::new();
        for (dep, users) in snapshot {
            for user in users {
                if user == dep {
                    continue;
                }
                graph
                    .forward
                    .entry(user.clone())
                    .or_default()
                    .insert(dep.clone());
                graph.reverse.entry(dep.clone()).or_default().insert(user);
            }
        }
        graph
    }

    /// Number of files with at least one dependent.
    #[inline]
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Drop a file's outgoing edges and clean up the reverse side.
    fn remove_file(&mut self, file: &Path) {
        let Some(old_deps) = self.forward.remove(file) else {
            return;
        };

        for dep in old_deps {
            if let Some(dependents) = self.reverse.get_mut(&dep) {
                dependents.remove(file);
                if dependents.is_empty() {
                    self.reverse.remove(&dep);
                }
            }
        }
    }
}
