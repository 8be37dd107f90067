//! User-facing messages and exit codes.

use std::process::ExitCode;
use sync_client::SyncReport;
use sync_core::SyncResult;

pub const INVALID_FILE_TYPE: &str =
    "Invalid file type, use --ignore-disallowed-file-types to ignore.";
pub const INVALID_AUTH: &str = "Username or password is incorrect.";
pub const NETWORK_ERROR: &str = "Network error.";
pub const LOGIN_SUCCESSFUL: &str = "Login successful.";
pub const LOGOUT_SUCCESSFUL: &str = "Logout successful.";
pub const NOT_LOGGED_IN: &str = "That username is not logged in. Use `sitesync login` first.";
pub const OUT_OF_SYNC: &str = "Out of sync, this happened because your local state file \
    contains file names which do not exist on the remote. To fix this, delete your state \
    file and re-run sitesync.";

/// The message for a terminal result, or `None` for success.
pub fn message(result: SyncResult) -> Option<&'static str> {
    match result {
        SyncResult::Ok => None,
        SyncResult::OutOfSync => Some(OUT_OF_SYNC),
        SyncResult::InvalidFileType => Some(INVALID_FILE_TYPE),
        SyncResult::InvalidAuth => Some(INVALID_AUTH),
        SyncResult::NetworkError => Some(NETWORK_ERROR),
    }
}

/// Exit status for a terminal result.
pub fn exit_code(result: SyncResult) -> ExitCode {
    if result.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Print the outcome of a login that did not produce a session.
pub fn login_failed(result: SyncResult) -> ExitCode {
    if let Some(msg) = message(result) {
        eprintln!("{msg}");
    }
    exit_code(result)
}

/// Print a finished pass.
pub fn finished(report: &SyncReport) -> ExitCode {
    match report.result {
        SyncResult::Ok => {
            println!("Synced.");
            println!("{} uploaded, {} deleted", report.uploaded, report.deleted);
        }
        result => {
            if let Some(msg) = message(result) {
                eprintln!("{msg}");
            }
        }
    }
    exit_code(report.result)
}

/// Print the plan of a dry run.
pub fn dry_run(report: &SyncReport) -> ExitCode {
    if report.plan.is_empty() {
        println!("Nothing to do.");
        return ExitCode::SUCCESS;
    }
    for path in &report.plan.upload {
        println!("upload {path}");
    }
    for path in &report.plan.delete {
        println!("delete {path}");
    }
    println!(
        "{} to upload, {} to delete (dry run)",
        report.plan.upload.len(),
        report.plan.delete.len()
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_for_each_result() {
        assert_eq!(message(SyncResult::Ok), None);
        assert_eq!(
            message(SyncResult::InvalidFileType),
            Some("Invalid file type, use --ignore-disallowed-file-types to ignore.")
        );
        assert_eq!(
            message(SyncResult::InvalidAuth),
            Some("Username or password is incorrect.")
        );
        assert_eq!(message(SyncResult::NetworkError), Some("Network error."));
        assert!(message(SyncResult::OutOfSync)
            .unwrap()
            .contains("delete your state file"));
    }

    #[test]
    fn out_of_sync_is_not_a_failure() {
        assert!(!SyncResult::OutOfSync.is_failure());
        assert!(message(SyncResult::OutOfSync).is_some());
    }
}
