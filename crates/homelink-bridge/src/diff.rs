//! Snapshot presence diff.
//!
//! Keeps the previous registry snapshot and classifies the current one into
//! added and removed units, keyed by stable id only. Attribute changes on an
//! existing id are deliberately not reported; content changes travel through
//! the per-unit config/data streams instead. Callers must serialize calls
//! (the discovery coordinator guarantees this).

use std::collections::HashMap;

use homelink_model::{UnitEntity, UnitId};

/// Result of one diff pass.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    /// Units present now but absent from the previous snapshot
    pub added: Vec<UnitEntity>,
    /// Units present in the previous snapshot but absent now
    pub removed: Vec<UnitEntity>,
}

impl DiffReport {
    /// Whether the pass found no changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Stateful presence diff over unit snapshots.
#[derive(Debug, Default)]
pub struct SnapshotDiff {
    previous: HashMap<UnitId, UnitEntity>,
}

impl SnapshotDiff {
    /// Create a diff starting from an empty snapshot; the first pass reports
    /// every unit as added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against the retained snapshot, then retain `current`.
    pub fn diff(&mut self, current: &[UnitEntity]) -> DiffReport {
        let mut next: HashMap<UnitId, UnitEntity> = HashMap::with_capacity(current.len());
        let mut added = Vec::new();

        for unit in current {
            if !self.previous.contains_key(&unit.id) {
                added.push(unit.clone());
            }
            next.insert(unit.id.clone(), unit.clone());
        }

        let removed = self
            .previous
            .drain()
            .filter(|(id, _)| !next.contains_key(id))
            .map(|(_, unit)| unit)
            .collect();

        self.previous = next;
        DiffReport { added, removed }
    }

    /// Number of units in the retained snapshot.
    pub fn snapshot_len(&self) -> usize {
        self.previous.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelink_model::UnitKind;

    fn unit(id: &str) -> UnitEntity {
        UnitEntity::new(id, UnitKind::Other)
    }

    fn ids(units: &[UnitEntity]) -> Vec<&str> {
        let mut ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_first_pass_reports_everything_added() {
        let mut diff = SnapshotDiff::new();
        let report = diff.diff(&[unit("a"), unit("b")]);

        assert_eq!(ids(&report.added), vec!["a", "b"]);
        assert!(report.removed.is_empty());
        assert_eq!(diff.snapshot_len(), 2);
    }

    #[test]
    fn test_set_semantics() {
        // added = S2 \ S1, removed = S1 \ S2, no id in both sets.
        let mut diff = SnapshotDiff::new();
        diff.diff(&[unit("a"), unit("b"), unit("c")]);
        let report = diff.diff(&[unit("b"), unit("c"), unit("d")]);

        assert_eq!(ids(&report.added), vec!["d"]);
        assert_eq!(ids(&report.removed), vec!["a"]);
        for added in &report.added {
            assert!(!report.removed.iter().any(|r| r.id == added.id));
        }
    }

    #[test]
    fn test_idempotent_on_same_snapshot() {
        let mut diff = SnapshotDiff::new();
        let snapshot = vec![unit("a"), unit("b")];
        diff.diff(&snapshot);
        let report = diff.diff(&snapshot);

        assert!(report.is_empty());
    }

    #[test]
    fn test_attribute_changes_are_not_reported() {
        let mut diff = SnapshotDiff::new();
        diff.diff(&[unit("a")]);

        // Same id, different content: a presence diff stays silent.
        let changed = UnitEntity::new("a", UnitKind::Light);
        let report = diff.diff(&[changed]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_empty_snapshot_removes_everything() {
        let mut diff = SnapshotDiff::new();
        diff.diff(&[unit("a"), unit("b")]);
        let report = diff.diff(&[]);

        assert!(report.added.is_empty());
        assert_eq!(ids(&report.removed), vec!["a", "b"]);
        assert_eq!(diff.snapshot_len(), 0);
    }
}
