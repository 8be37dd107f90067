//! The sync orchestrator.
//!
//! One pass runs load → scan → reconcile → apply and folds the remote's
//! answers into a [`SyncResult`]. Expected remote failures end the pass with
//! a result; store, scan and protocol failures abort it with a [`SyncError`].

use sync_core::{reconcile, ApplyMode, Confirmed, Plan, SyncResult, SyncState};
use sync_types::{DeleteOutcome, ProtocolError, Session};
use thiserror::Error;

use crate::remote::{fetch_remote_state, RemoteApi, RemoteState, PROTECTED_PATHS};
use crate::scan::{ScanError, Scanner};
use crate::store::{StateStore, StoreError};

/// Errors that abort a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The state could not be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The local tree could not be scanned or read.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The remote answered with something we do not understand.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Knobs for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Ordering of the remote calls and the state write.
    pub apply_mode: ApplyMode,
    /// Plan only; make no remote or state changes.
    pub dry_run: bool,
}

/// Where the baseline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSource {
    /// The local state file.
    StateFile,
    /// A listing of the remote, because no state was saved.
    Remote,
}

/// What a pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Terminal result.
    pub result: SyncResult,
    /// The reconciled plan. Empty if the pass ended before planning.
    pub plan: Plan,
    /// Files the remote confirmed uploading.
    pub uploaded: usize,
    /// Paths the remote confirmed deleting.
    pub deleted: usize,
    /// Whether the state was written.
    pub state_saved: bool,
    /// Where the baseline came from.
    pub baseline_source: BaselineSource,
}

impl SyncReport {
    fn ended_early(result: SyncResult, baseline_source: BaselineSource) -> Self {
        Self {
            result,
            plan: Plan::default(),
            uploaded: 0,
            deleted: 0,
            state_saved: false,
            baseline_source,
        }
    }
}

/// Drives sync passes for one local tree against one remote.
///
/// # Example
///
/// ```ignore
/// let syncer = Syncer::new(HttpRemote::new()?, FileStateStore::new(state), scanner);
/// let report = syncer.run(&session).await?;
/// ```
#[derive(Debug)]
pub struct Syncer<R, S> {
    remote: R,
    store: S,
    scanner: Scanner,
    options: SyncOptions,
}

impl<R, S> Syncer<R, S>
where
    R: RemoteApi,
    S: StateStore,
{
    /// Create a syncer with default options.
    pub fn new(remote: R, store: S, scanner: Scanner) -> Self {
        Self {
            remote,
            store,
            scanner,
            options: SyncOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// The remote collaborator.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// The state store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The scanner.
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Run one pass.
    pub async fn run(&self, session: &Session) -> Result<SyncReport, SyncError> {
        let (mut baseline, source) = match self.store.load().await? {
            Some(state) => (state, BaselineSource::StateFile),
            None => {
                tracing::info!("No saved state; using the remote listing as baseline");
                match fetch_remote_state(&self.remote, session).await? {
                    RemoteState::Fetched(state) => (state, BaselineSource::Remote),
                    RemoteState::Unavailable(result) => {
                        return Ok(SyncReport::ended_early(result, BaselineSource::Remote))
                    }
                }
            }
        };

        let scanned = self.scanner.scan().await?;
        baseline.retain_eligible(self.scanner.exclusions());
        let plan = reconcile(&baseline, &scanned);
        tracing::info!(
            "Planned {} uploads and {} deletes",
            plan.upload.len(),
            plan.delete.len()
        );

        if self.options.dry_run {
            return Ok(SyncReport {
                result: SyncResult::Ok,
                plan,
                uploaded: 0,
                deleted: 0,
                state_saved: false,
                baseline_source: source,
            });
        }

        // Read everything up front so a vanished file aborts before any
        // remote change.
        let files = self.scanner.read_files(&plan.upload).await?;
        let deletes = deletable(&plan.delete);

        let (upload, delete) = match self.options.apply_mode {
            ApplyMode::Fast => {
                let state = SyncState::from(&scanned);
                let (upload, delete, saved) = tokio::join!(
                    self.remote.upload(session, files),
                    self.remote.delete(session, deletes.clone()),
                    self.store.save(&state),
                );
                saved?;
                (upload?, delete?)
            }
            ApplyMode::Safe => {
                let (upload, delete) = tokio::join!(
                    self.remote.upload(session, files),
                    self.remote.delete(session, deletes.clone()),
                );
                let confirmed = Confirmed {
                    uploaded: upload.as_ref().is_ok_and(|o| o.is_success()),
                    deleted: delete.as_ref().is_ok_and(|o| o.is_success()),
                };
                if !confirmed.uploaded || !confirmed.deleted {
                    tracing::warn!(
                        "Remote did not confirm all changes (uploads: {}, deletes: {}); \
                         keeping unconfirmed paths for the next run",
                        confirmed.uploaded,
                        confirmed.deleted
                    );
                }
                let mut next = plan.next_baseline(&baseline, &scanned, confirmed);
                if matches!(delete, Ok(DeleteOutcome::MissingFiles)) {
                    self.forget_absent(session, &plan.delete, &mut next).await;
                }
                self.store.save(&next).await?;
                (upload?, delete?)
            }
        };

        let result = SyncResult::resolve(&upload, &delete);
        let uploaded = if upload.is_success() {
            plan.upload.len()
        } else {
            0
        };
        let deleted = if delete == DeleteOutcome::Deleted {
            deletes.len()
        } else {
            0
        };
        tracing::info!("Sync finished: {}", result);

        Ok(SyncReport {
            result,
            plan,
            uploaded,
            deleted,
            state_saved: true,
            baseline_source: source,
        })
    }

    /// After a rejected delete batch, keep only the delete paths the remote
    /// still has. If the listing fails, every delete path stays remembered.
    async fn forget_absent(&self, session: &Session, delete: &[String], next: &mut SyncState) {
        match fetch_remote_state(&self.remote, session).await {
            Ok(RemoteState::Fetched(remote)) => {
                for path in delete {
                    if !remote.contains(path) {
                        tracing::info!("Forgetting {}; it is not on the remote", path);
                        next.remove(path);
                    }
                }
            }
            Ok(RemoteState::Unavailable(result)) => {
                tracing::warn!("Could not list the remote ({}); keeping delete paths", result);
            }
            Err(e) => {
                tracing::warn!("Could not list the remote ({}); keeping delete paths", e);
            }
        }
    }
}

/// The delete set minus paths the host never deletes.
fn deletable(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .filter(|path| {
            let protected = PROTECTED_PATHS.contains(&path.as_str());
            if protected {
                tracing::info!("Leaving protected {} on the remote", path);
            }
            !protected
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MockRemote, RemoteCall};
    use crate::store::MemoryStateStore;
    use std::fs;
    use std::path::Path;
    use sync_core::Exclusions;
    use sync_types::{ContentHash, ListOutcome, UploadOutcome};
    use tempfile::TempDir;

    const HELLO_HASH: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

    fn site(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, contents) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, contents).unwrap();
        }
        dir
    }

    fn hash(contents: &str) -> ContentHash {
        ContentHash::compute(contents.as_bytes())
    }

    fn state(pairs: &[(&str, &str)]) -> SyncState {
        pairs.iter().map(|(p, c)| (*p, hash(c))).collect()
    }

    fn syncer(
        root: &Path,
        store: MemoryStateStore,
        options: SyncOptions,
    ) -> Syncer<MockRemote, MemoryStateStore> {
        Syncer::new(
            MockRemote::new(),
            store,
            Scanner::new(root, Exclusions::new()),
        )
        .with_options(options)
    }

    fn session() -> Session {
        Session::new("session-key")
    }

    fn safe() -> SyncOptions {
        SyncOptions::default()
    }

    fn fast() -> SyncOptions {
        SyncOptions {
            apply_mode: ApplyMode::Fast,
            dry_run: false,
        }
    }

    // ===========================================
    // Happy Path Tests
    // ===========================================

    #[tokio::test]
    async fn first_run_seeds_from_remote_and_uploads() {
        let dir = site(&[("hello.txt", "hello world"), ("new.txt", "new")]);
        let syncer = syncer(dir.path(), MemoryStateStore::new(), safe());
        syncer.remote().insert_file("hello.txt", "hello world");
        syncer.remote().insert_file("stale.txt", "old");

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::Ok);
        assert_eq!(report.baseline_source, BaselineSource::Remote);
        assert_eq!(report.plan.upload, vec!["new.txt"]);
        assert_eq!(report.plan.delete, vec!["stale.txt"]);
        assert_eq!((report.uploaded, report.deleted), (1, 1));
        assert_eq!(
            syncer.store().state(),
            Some(state(&[("hello.txt", "hello world"), ("new.txt", "new")]))
        );
        assert_eq!(
            syncer.remote().files().keys().collect::<Vec<_>>(),
            vec!["hello.txt", "new.txt"]
        );
    }

    #[tokio::test]
    async fn unchanged_tree_sends_nothing_but_rewrites_state() {
        let dir = site(&[("hello.txt", "hello world")]);
        let store = MemoryStateStore::with_state(state(&[("hello.txt", "hello world")]));
        let syncer = syncer(dir.path(), store, safe());

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::Ok);
        assert!(report.plan.is_empty());
        assert!(report.state_saved);
        assert!(syncer.remote().calls().is_empty());
        assert_eq!(syncer.store().save_count(), 1);
    }

    #[tokio::test]
    async fn calls_carry_the_session() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[("gone.txt", "x")]));
        let syncer = syncer(dir.path(), store, safe());
        syncer.remote().insert_file("gone.txt", "x");

        syncer.run(&session()).await.unwrap();

        assert_eq!(
            syncer.remote().calls(),
            vec![
                RemoteCall::Upload {
                    api_key: "session-key".into(),
                    paths: vec!["a.txt".into()],
                },
                RemoteCall::Delete {
                    api_key: "session-key".into(),
                    paths: vec!["gone.txt".into()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn unknown_hash_entries_reupload() {
        let dir = site(&[("hello.txt", "hello world")]);
        let store = MemoryStateStore::with_state(SyncState::parse("hello.txt"));
        let syncer = syncer(dir.path(), store, safe());

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.plan.upload, vec!["hello.txt"]);
        let saved = syncer.store().state().unwrap();
        assert!(saved
            .get("hello.txt")
            .unwrap()
            .matches(&ContentHash::new(HELLO_HASH)));
    }

    // ===========================================
    // Terminal Result Tests
    // ===========================================

    #[tokio::test]
    async fn missing_state_and_rejected_listing_is_invalid_auth_without_scan() {
        // A root that does not exist: any scan would fail.
        let dir = tempfile::tempdir().unwrap();
        let syncer = syncer(&dir.path().join("missing"), MemoryStateStore::new(), safe());
        syncer.remote().queue_list(ListOutcome::InvalidAuth);

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::InvalidAuth);
        assert!(!report.state_saved);
        assert_eq!(syncer.store().save_count(), 0);
    }

    #[tokio::test]
    async fn missing_state_and_failed_listing_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let syncer = syncer(&dir.path().join("missing"), MemoryStateStore::new(), safe());
        syncer
            .remote()
            .queue_list(ListOutcome::NetworkError("timed out".into()));

        let report = syncer.run(&session()).await.unwrap();
        assert_eq!(report.result, SyncResult::NetworkError);
    }

    #[tokio::test]
    async fn excluded_files_are_neither_uploaded_nor_deleted() {
        let dir = site(&[("site.css", "body {}"), ("page.wasm", "bin")]);
        let store = MemoryStateStore::with_state(state(&[
            ("site.css", "old css"),
            ("gone.html", "<p>"),
        ]));
        let scanner = Scanner::new(
            dir.path(),
            Exclusions::new().ignore_disallowed_file_types(true),
        );
        let syncer = Syncer::new(MockRemote::new(), store, scanner);

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::Ok);
        assert_eq!(report.plan.upload, vec!["page.wasm"]);
        assert!(report.plan.delete.is_empty());
        assert_eq!(
            syncer.store().state(),
            Some(state(&[("page.wasm", "bin")]))
        );
    }

    #[tokio::test]
    async fn empty_delete_set_is_ok() {
        let dir = site(&[("a.txt", "a"), ("b.txt", "b")]);
        let store = MemoryStateStore::with_state(state(&[("a.txt", "a")]));
        let syncer = syncer(dir.path(), store, safe());

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::Ok);
        assert!(report.plan.delete.is_empty());
        assert!(!syncer
            .remote()
            .calls()
            .iter()
            .any(|c| matches!(c, RemoteCall::Delete { .. })));
    }

    #[tokio::test]
    async fn missing_remote_files_is_out_of_sync() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[("a.txt", "a"), ("ghost.txt", "g")]));
        let syncer = syncer(dir.path(), store, safe());

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::OutOfSync);
        assert_eq!(report.deleted, 0);
        // The listing shows the path is gone, so it is forgotten.
        assert_eq!(syncer.store().state(), Some(state(&[("a.txt", "a")])));
    }

    #[tokio::test]
    async fn rejected_delete_batch_keeps_paths_still_on_remote() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[
            ("a.txt", "a"),
            ("gone.txt", "g"),
            ("ghost.txt", "x"),
        ]));
        let syncer = syncer(dir.path(), store, safe());
        syncer.remote().insert_file("a.txt", "a");
        syncer.remote().insert_file("gone.txt", "g");

        let first = syncer.run(&session()).await.unwrap();

        assert_eq!(first.result, SyncResult::OutOfSync);
        assert_eq!(
            syncer.remote().files().keys().collect::<Vec<_>>(),
            vec!["a.txt", "gone.txt"]
        );
        assert_eq!(
            syncer.store().state(),
            Some(state(&[("a.txt", "a"), ("gone.txt", "g")]))
        );

        let second = syncer.run(&session()).await.unwrap();

        assert_eq!(second.result, SyncResult::Ok);
        assert_eq!(second.plan.delete, vec!["gone.txt"]);
        assert_eq!(second.deleted, 1);
        assert_eq!(
            syncer.remote().files().keys().collect::<Vec<_>>(),
            vec!["a.txt"]
        );
        assert_eq!(syncer.store().state(), Some(state(&[("a.txt", "a")])));
    }

    #[tokio::test]
    async fn rejected_delete_batch_without_listing_keeps_every_path() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[
            ("a.txt", "a"),
            ("gone.txt", "g"),
            ("ghost.txt", "x"),
        ]));
        let syncer = syncer(dir.path(), store, safe());
        syncer.remote().insert_file("gone.txt", "g");
        syncer
            .remote()
            .queue_list(ListOutcome::NetworkError("reset".into()));

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::OutOfSync);
        assert_eq!(
            syncer.store().state(),
            Some(state(&[("a.txt", "a"), ("gone.txt", "g"), ("ghost.txt", "x")]))
        );
    }

    #[tokio::test]
    async fn protected_paths_are_not_sent_or_counted() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[
            ("a.txt", "a"),
            ("index.html", "<p>"),
            ("old.txt", "o"),
        ]));
        let syncer = syncer(dir.path(), store, safe());
        syncer.remote().insert_file("index.html", "<p>");
        syncer.remote().insert_file("old.txt", "o");

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::Ok);
        assert_eq!(report.plan.delete, vec!["index.html", "old.txt"]);
        assert_eq!(report.deleted, 1);
        assert_eq!(
            syncer.remote().calls(),
            vec![RemoteCall::Delete {
                api_key: "session-key".into(),
                paths: vec!["old.txt".into()],
            }]
        );
        assert!(syncer.remote().files().contains_key("index.html"));
    }

    #[tokio::test]
    async fn only_protected_deletes_send_nothing() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[("a.txt", "a"), ("index.html", "<p>")]));
        let syncer = syncer(dir.path(), store, safe());

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::Ok);
        assert_eq!(report.deleted, 0);
        assert!(syncer.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn upload_failure_takes_priority_over_delete_failure() {
        let dir = site(&[("a.exe", "MZ")]);
        let store = MemoryStateStore::with_state(state(&[("gone.txt", "x")]));
        let syncer = syncer(dir.path(), store, safe());
        syncer.remote().queue_upload(UploadOutcome::InvalidFileType);
        syncer.remote().queue_delete(DeleteOutcome::InvalidAuth);

        let report = syncer.run(&session()).await.unwrap();
        assert_eq!(report.result, SyncResult::InvalidFileType);
    }

    // ===========================================
    // Apply Mode Tests
    // ===========================================

    #[tokio::test]
    async fn safe_mode_failed_upload_keeps_old_hashes() {
        let dir = site(&[("a.txt", "changed"), ("new.txt", "new")]);
        let store = MemoryStateStore::with_state(state(&[("a.txt", "a"), ("gone.txt", "x")]));
        let syncer = syncer(dir.path(), store, safe());
        syncer.remote().insert_file("gone.txt", "x");
        syncer.remote().queue_upload(UploadOutcome::InvalidFileType);

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::InvalidFileType);
        assert_eq!(report.uploaded, 0);
        assert_eq!(report.deleted, 1);
        // Upload paths revert; the confirmed delete sticks.
        assert_eq!(syncer.store().state(), Some(state(&[("a.txt", "a")])));
    }

    #[tokio::test]
    async fn safe_mode_failed_delete_keeps_delete_paths() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[("a.txt", "a"), ("gone.txt", "x")]));
        let syncer = syncer(dir.path(), store, safe());
        syncer
            .remote()
            .queue_delete(DeleteOutcome::NetworkError("reset".into()));

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::NetworkError);
        assert_eq!(
            syncer.store().state(),
            Some(state(&[("a.txt", "a"), ("gone.txt", "x")]))
        );
    }

    #[tokio::test]
    async fn fast_mode_persists_scan_even_on_failure() {
        let dir = site(&[("a.txt", "changed")]);
        let store = MemoryStateStore::with_state(state(&[("a.txt", "a"), ("gone.txt", "x")]));
        let syncer = syncer(dir.path(), store, fast());
        syncer
            .remote()
            .queue_upload(UploadOutcome::NetworkError("reset".into()));

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.result, SyncResult::NetworkError);
        assert_eq!(syncer.store().state(), Some(state(&[("a.txt", "changed")])));
    }

    #[tokio::test]
    async fn dry_run_touches_nothing() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(state(&[("gone.txt", "x")]));
        let syncer = syncer(
            dir.path(),
            store,
            SyncOptions {
                apply_mode: ApplyMode::Safe,
                dry_run: true,
            },
        );

        let report = syncer.run(&session()).await.unwrap();

        assert_eq!(report.plan.upload, vec!["a.txt"]);
        assert_eq!(report.plan.delete, vec!["gone.txt"]);
        assert!(!report.state_saved);
        assert!(syncer.remote().calls().is_empty());
        assert_eq!(syncer.store().save_count(), 0);
    }

    // ===========================================
    // Fatal Error Tests
    // ===========================================

    #[tokio::test]
    async fn unreadable_state_aborts() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::new();
        store.fail_next_load("permission denied");
        let syncer = syncer(dir.path(), store, safe());

        let result = syncer.run(&session()).await;

        assert!(matches!(result, Err(SyncError::Store(StoreError::Read { .. }))));
        assert!(syncer.remote().calls().is_empty());
    }

    #[tokio::test]
    async fn scan_failure_aborts_before_remote_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStateStore::with_state(state(&[("a.txt", "a")]));
        let syncer = syncer(&dir.path().join("missing"), store, safe());

        let result = syncer.run(&session()).await;

        assert!(matches!(result, Err(SyncError::Scan(_))));
        assert!(syncer.remote().calls().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn non_utf8_file_name_aborts_before_remote_calls() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = site(&[("a.txt", "a")]);
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.txt")), "x").unwrap();
        let store = MemoryStateStore::with_state(state(&[("gone.txt", "x")]));
        let syncer = syncer(dir.path(), store, safe());

        let result = syncer.run(&session()).await;

        assert!(matches!(
            result,
            Err(SyncError::Scan(ScanError::NonUtf8Path(_)))
        ));
        assert!(syncer.remote().calls().is_empty());
        assert_eq!(syncer.store().save_count(), 0);
    }

    #[tokio::test]
    async fn protocol_error_aborts_after_saving_confirmed_changes() {
        let dir = site(&[("new.txt", "new")]);
        let store = MemoryStateStore::with_state(state(&[("gone.txt", "x")]));
        let syncer = syncer(dir.path(), store, safe());
        syncer.remote().insert_file("gone.txt", "x");
        syncer.remote().fail_next_protocol("site_suspended");

        let result = syncer.run(&session()).await;

        assert!(matches!(result, Err(SyncError::Protocol(_))));
        // The delete went through; the upload did not.
        assert_eq!(syncer.store().state(), Some(SyncState::new()));
    }

    #[tokio::test]
    async fn state_write_failure_aborts() {
        let dir = site(&[("a.txt", "a")]);
        let store = MemoryStateStore::with_state(SyncState::new());
        store.fail_next_save("disk full");
        let syncer = syncer(dir.path(), store, safe());

        let result = syncer.run(&session()).await;
        assert!(matches!(result, Err(SyncError::Store(StoreError::Write { .. }))));
    }
}
