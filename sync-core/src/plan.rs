//! The reconciler: what to upload, what to delete, what to remember.
//!
//! Reconciling is two set differences over path keys plus a hash comparison
//! on the intersection, O(n) with map lookups:
//! - a scanned path uploads when the baseline lacks it or remembers a
//!   different (or unknown) hash
//! - a baseline path deletes when the scan no longer has it
//!
//! A rename is therefore a delete of the old path and an upload of the new
//! one, even when the bytes are identical.

use crate::scan::ScanResult;
use crate::state::SyncState;

/// Uploads and deletes needed to make the remote match the scan.
///
/// Both lists are sorted and never share a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Paths whose local content is new or changed.
    pub upload: Vec<String>,
    /// Paths that are remembered but no longer exist locally.
    pub delete: Vec<String>,
}

/// Which halves of an applied plan the remote confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmed {
    /// The upload call succeeded.
    pub uploaded: bool,
    /// The delete call succeeded.
    pub deleted: bool,
}

impl Confirmed {
    /// Both halves succeeded.
    pub fn all() -> Self {
        Self {
            uploaded: true,
            deleted: true,
        }
    }
}

/// Compare the baseline with a fresh scan.
pub fn reconcile(baseline: &SyncState, scanned: &ScanResult) -> Plan {
    let upload = scanned
        .iter()
        .filter(|(path, hash)| !baseline.get(path).is_some_and(|old| old.matches(hash)))
        .map(|(path, _)| path.clone())
        .collect();

    let delete = baseline
        .iter()
        .filter(|(path, _)| !scanned.contains(path))
        .map(|(path, _)| path.clone())
        .collect();

    Plan { upload, delete }
}

impl Plan {
    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.upload.is_empty() && self.delete.is_empty()
    }

    /// The state to persist once the remote has answered.
    ///
    /// With everything confirmed this is exactly the scan. An unconfirmed
    /// upload keeps each upload path at its baseline value (or forgets it if
    /// the baseline never had it). An unconfirmed delete keeps each delete
    /// path remembered, so the next run tries again.
    pub fn next_baseline(
        &self,
        baseline: &SyncState,
        scanned: &ScanResult,
        confirmed: Confirmed,
    ) -> SyncState {
        let mut next = SyncState::from(scanned);

        if !confirmed.uploaded {
            for path in &self.upload {
                match baseline.get(path) {
                    Some(old) => next.insert(path.clone(), old.clone()),
                    None => {
                        next.remove(path);
                    }
                }
            }
        }

        if !confirmed.deleted {
            for path in &self.delete {
                if let Some(old) = baseline.get(path) {
                    next.insert(path.clone(), old.clone());
                }
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_types::{ContentHash, RecordedHash};

    fn state(pairs: &[(&str, &str)]) -> SyncState {
        pairs.iter().copied().collect()
    }

    fn scan(pairs: &[(&str, &str)]) -> ScanResult {
        pairs.iter().copied().collect()
    }

    fn plan(upload: &[&str], delete: &[&str]) -> Plan {
        Plan {
            upload: upload.iter().map(|s| s.to_string()).collect(),
            delete: delete.iter().map(|s| s.to_string()).collect(),
        }
    }

    // ===========================================
    // Scenario Tests
    // ===========================================

    #[test]
    fn new_file_uploads() {
        let result = reconcile(
            &state(&[("a.txt", "h1")]),
            &scan(&[("a.txt", "h1"), ("b.txt", "h2")]),
        );
        assert_eq!(result, plan(&["b.txt"], &[]));
    }

    #[test]
    fn missing_file_deletes() {
        let result = reconcile(
            &state(&[("a.txt", "h1"), ("b.txt", "h2")]),
            &scan(&[("a.txt", "h1")]),
        );
        assert_eq!(result, plan(&[], &["b.txt"]));
    }

    #[test]
    fn changed_content_uploads() {
        let result = reconcile(&state(&[("a.txt", "h1")]), &scan(&[("a.txt", "h9")]));
        assert_eq!(result, plan(&["a.txt"], &[]));
    }

    #[test]
    fn rename_is_delete_plus_upload() {
        let result = reconcile(&state(&[("old.txt", "h1")]), &scan(&[("new.txt", "h1")]));
        assert_eq!(result, plan(&["new.txt"], &["old.txt"]));
    }

    // ===========================================
    // Edge Case Tests
    // ===========================================

    #[test]
    fn empty_scan_deletes_everything() {
        let result = reconcile(&state(&[("a.txt", "h1"), ("b.txt", "h2")]), &scan(&[]));
        assert_eq!(result, plan(&[], &["a.txt", "b.txt"]));
    }

    #[test]
    fn empty_baseline_uploads_everything() {
        let result = reconcile(&SyncState::new(), &scan(&[("b.txt", "h2"), ("a.txt", "h1")]));
        assert_eq!(result, plan(&["a.txt", "b.txt"], &[]));
    }

    #[test]
    fn nothing_changed_is_empty_plan() {
        let result = reconcile(&state(&[("a.txt", "h1")]), &scan(&[("a.txt", "h1")]));
        assert!(result.is_empty());
    }

    #[test]
    fn unknown_hash_always_uploads() {
        let mut baseline = SyncState::new();
        baseline.insert("a.txt", RecordedHash::Unknown);
        let result = reconcile(&baseline, &scan(&[("a.txt", "h1")]));
        assert_eq!(result, plan(&["a.txt"], &[]));
    }

    #[test]
    fn hash_comparison_is_exact() {
        let result = reconcile(&state(&[("a.txt", "ABC")]), &scan(&[("a.txt", "abc")]));
        assert_eq!(result, plan(&["a.txt"], &[]));
    }

    // ===========================================
    // Invariant Tests
    // ===========================================

    /// Small exhaustive family of baselines and scans over three paths and
    /// two hashes (absent / h1 / h2 per path).
    fn cases() -> Vec<(SyncState, ScanResult)> {
        let paths = ["a", "b", "c"];
        let mut states = Vec::new();
        let mut scans = Vec::new();
        for code in 0..27u32 {
            let mut st = SyncState::new();
            let mut sc = ScanResult::new();
            let mut rest = code;
            for path in paths {
                match rest % 3 {
                    1 => {
                        st.insert(path, ContentHash::new("h1"));
                        sc.insert(path, ContentHash::new("h1"));
                    }
                    2 => {
                        st.insert(path, ContentHash::new("h2"));
                        sc.insert(path, ContentHash::new("h2"));
                    }
                    _ => {}
                }
                rest /= 3;
            }
            states.push(st);
            scans.push(sc);
        }
        let mut out = Vec::new();
        for st in &states {
            for sc in &scans {
                out.push((st.clone(), sc.clone()));
            }
        }
        out
    }

    #[test]
    fn upload_and_delete_are_disjoint() {
        for (baseline, scanned) in cases() {
            let result = reconcile(&baseline, &scanned);
            for path in &result.upload {
                assert!(!result.delete.contains(path), "{path} in both sets");
            }
        }
    }

    #[test]
    fn upload_paths_are_scanned_and_delete_paths_are_gone() {
        for (baseline, scanned) in cases() {
            let result = reconcile(&baseline, &scanned);
            assert!(result.upload.iter().all(|p| scanned.contains(p)));
            assert!(result
                .delete
                .iter()
                .all(|p| baseline.contains(p) && !scanned.contains(p)));
        }
    }

    #[test]
    fn every_path_is_accounted_for() {
        for (baseline, scanned) in cases() {
            let result = reconcile(&baseline, &scanned);
            for (path, old) in baseline.iter() {
                let unchanged = scanned.get(path).is_some_and(|new| old.matches(new));
                let updated = result.upload.contains(path);
                let deleted = result.delete.contains(path);
                assert_eq!(
                    [unchanged, updated, deleted].iter().filter(|b| **b).count(),
                    1,
                    "{path} must be exactly one of unchanged/updated/deleted"
                );
            }
            for (path, new) in scanned.iter() {
                let unchanged = baseline.get(path).is_some_and(|old| old.matches(new));
                assert_ne!(unchanged, result.upload.contains(path));
            }
        }
    }

    #[test]
    fn reconcile_with_itself_is_empty() {
        for (_, scanned) in cases() {
            let baseline = SyncState::from(&scanned);
            assert!(reconcile(&baseline, &scanned).is_empty());
        }
    }

    // ===========================================
    // Next Baseline Tests
    // ===========================================

    #[test]
    fn confirmed_apply_persists_scan() {
        let baseline = state(&[("a.txt", "h1"), ("gone.txt", "h2")]);
        let scanned = scan(&[("a.txt", "h9"), ("new.txt", "h3")]);
        let result = reconcile(&baseline, &scanned);
        let next = result.next_baseline(&baseline, &scanned, Confirmed::all());
        assert_eq!(next, SyncState::from(&scanned));
    }

    #[test]
    fn failed_upload_reverts_upload_paths() {
        let baseline = state(&[("a.txt", "h1"), ("same.txt", "h5")]);
        let scanned = scan(&[("a.txt", "h9"), ("new.txt", "h3"), ("same.txt", "h5")]);
        let result = reconcile(&baseline, &scanned);
        let next = result.next_baseline(
            &baseline,
            &scanned,
            Confirmed {
                uploaded: false,
                deleted: true,
            },
        );
        assert_eq!(next, state(&[("a.txt", "h1"), ("same.txt", "h5")]));
    }

    #[test]
    fn failed_delete_keeps_delete_paths() {
        let baseline = state(&[("a.txt", "h1"), ("gone.txt", "h2")]);
        let scanned = scan(&[("a.txt", "h1")]);
        let result = reconcile(&baseline, &scanned);
        let next = result.next_baseline(
            &baseline,
            &scanned,
            Confirmed {
                uploaded: true,
                deleted: false,
            },
        );
        assert_eq!(next, baseline);
        // Next run retries the delete.
        assert_eq!(reconcile(&next, &scanned), plan(&[], &["gone.txt"]));
    }

    #[test]
    fn nothing_confirmed_is_baseline() {
        let baseline = state(&[("a.txt", "h1"), ("gone.txt", "h2")]);
        let scanned = scan(&[("a.txt", "h2"), ("new.txt", "h3")]);
        let result = reconcile(&baseline, &scanned);
        let next = result.next_baseline(
            &baseline,
            &scanned,
            Confirmed {
                uploaded: false,
                deleted: false,
            },
        );
        assert_eq!(next, baseline);
    }
}
