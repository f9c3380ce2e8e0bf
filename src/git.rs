//! Commit and push the regenerated site

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::process::Command;

fn git(root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !output.status.success() {
        bail!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub fn commit_message(now: DateTime<Utc>) -> String {
    format!("Update holidays from remote {}", now.format("%Y-%m-%d %H:%M:%S UTC"))
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// `git status` itself failed, so nothing was attempted
    Skipped,
    NothingToCommit,
    Pushed,
}

/// Stage everything, commit and push to `origin main`.
///
/// A failing status check is only a warning. Once changes are known to exist,
/// any failing step is an error.
pub fn commit_and_push(root: &Path, message: &str) -> Result<CommitOutcome> {
    let status = match git(root, &["status", "--porcelain"]) {
        Ok(status) => status,
        Err(e) => {
            log::warn!("Skipping commit, git status failed: {:#}", e);
            return Ok(CommitOutcome::Skipped);
        }
    };
    if status.trim().is_empty() {
        println!("Nothing to commit.");
        return Ok(CommitOutcome::NothingToCommit);
    }

    git(root, &["add", "."])?;
    git(root, &["commit", "-m", message])?;
    git(root, &["push", "origin", "main"])?;
    println!("Committed and pushed: {}", message);
    Ok(CommitOutcome::Pushed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_commit_message() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            commit_message(now),
            "Update holidays from remote 2025-03-14 09:26:53 UTC"
        );
    }

    #[test]
    fn test_status_failure_skips_commit() {
        // A fresh temp dir is not a repository, so `git status` fails
        let dir = tempfile::tempdir().unwrap();
        let outcome = commit_and_push(dir.path(), "msg").unwrap();
        assert_eq!(outcome, CommitOutcome::Skipped);
    }
}
