//! Removal of users from an organization.
//!
//! Dry-run is the default: the candidates are reported and nothing is
//! deleted. In apply mode every candidate is attempted in turn; a failed
//! deletion is recorded and the batch carries on. Entries with an unknown
//! origin are skipped in both modes.

use std::fmt;

use tracing::{info, warn};

use crate::directory::{DirectoryEntry, Origin};
use crate::github::MemberOps;

/// Whether deletions were issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    DryRun,
    Applied,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalStatus {
    /// Would be removed (dry-run).
    Planned,
    Removed,
    Failed(String),
    Skipped(String),
}

/// One candidate and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub entry: DirectoryEntry,
    pub status: RemovalStatus,
}

/// Result of a removal run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    pub org: String,
    pub mode: RemovalMode,
    pub outcomes: Vec<RemovalOutcome>,
}

impl RemovalReport {
    /// True when there was nothing to remove.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == RemovalMode::DryRun
    }

    fn count(&self, pred: impl Fn(&RemovalStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// Candidates that a dry-run would remove.
    pub fn planned(&self) -> usize {
        self.count(|s| matches!(s, RemovalStatus::Planned))
    }

    /// Successful deletions.
    pub fn removed(&self) -> usize {
        self.count(|s| matches!(s, RemovalStatus::Removed))
    }

    /// Deletions the API rejected.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RemovalStatus::Failed(_)))
    }

    /// Candidates left alone: unknown origin, declined, or after a stop.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RemovalStatus::Skipped(_)))
    }
}

impl fmt::Display for RemovalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Nothing to remove from {}.", self.org);
        }

        if self.is_dry_run() {
            writeln!(
                f,
                "[dry-run] {} user(s) would be removed from {}:",
                self.planned(),
                self.org
            )?;
        } else {
            writeln!(f, "Removal results for {}:", self.org)?;
        }

        let total = self.outcomes.len();
        for (idx, outcome) in self.outcomes.iter().enumerate() {
            let entry = &outcome.entry;
            let status = match &outcome.status {
                RemovalStatus::Planned => "would remove".to_string(),
                RemovalStatus::Removed => "removed".to_string(),
                RemovalStatus::Failed(reason) => format!("FAILED: {}", reason),
                RemovalStatus::Skipped(reason) => format!("skipped: {}", reason),
            };
            writeln!(
                f,
                "  {}/{}: {} ({}) - {}",
                idx + 1,
                total,
                entry.login,
                entry.origin,
                status
            )?;
        }

        if self.is_dry_run() {
            write!(f, "Dry run: no changes made. Re-run with --apply to remove.")
        } else {
            write!(
                f,
                "{} removed, {} failed, {} skipped",
                self.removed(),
                self.failed(),
                self.skipped()
            )
        }
    }
}

/// Operator answer for one candidate in an interactive removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Remove,
    Skip,
    /// Stop the batch; this and every later candidate is left alone.
    Stop,
}

impl Decision {
    /// Parse a `[y/N/q]` prompt answer; anything but `y` or `q` skips.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Decision::Remove,
            "q" | "quit" => Decision::Stop,
            _ => Decision::Skip,
        }
    }
}

/// Remove `candidates` from `org`, or only report them when `dry_run` is set.
pub fn remove_users<A: MemberOps + ?Sized>(
    api: &A,
    org: &str,
    candidates: &[DirectoryEntry],
    dry_run: bool,
) -> RemovalReport {
    remove_users_confirmed(api, org, candidates, dry_run, |_| Decision::Remove)
}

/// Like [`remove_users`], but asks `confirm` before each deletion.
///
/// `confirm` is only consulted in apply mode and never for entries with an
/// unknown origin, which are always skipped.
pub fn remove_users_confirmed<A, F>(
    api: &A,
    org: &str,
    candidates: &[DirectoryEntry],
    dry_run: bool,
    mut confirm: F,
) -> RemovalReport
where
    A: MemberOps + ?Sized,
    F: FnMut(&DirectoryEntry) -> Decision,
{
    let mode = if dry_run {
        RemovalMode::DryRun
    } else {
        RemovalMode::Applied
    };

    if candidates.is_empty() {
        info!(org, "no users to remove");
    }

    let mut stopped = false;
    let outcomes = candidates
        .iter()
        .map(|entry| {
            let status = if let Origin::Unknown(tag) = &entry.origin {
                warn!(org, login = %entry.login, origin = %tag, "unknown user type, skipping delete");
                RemovalStatus::Skipped(format!("unknown user type '{}'", tag))
            } else if dry_run {
                RemovalStatus::Planned
            } else if stopped {
                RemovalStatus::Skipped("stopped".into())
            } else {
                match confirm(entry) {
                    Decision::Remove => remove_one(api, org, entry),
                    Decision::Skip => RemovalStatus::Skipped("declined".into()),
                    Decision::Stop => {
                        info!(org, login = %entry.login, "stopping removal early");
                        stopped = true;
                        RemovalStatus::Skipped("stopped".into())
                    }
                }
            };
            RemovalOutcome {
                entry: entry.clone(),
                status,
            }
        })
        .collect();

    RemovalReport {
        org: org.to_string(),
        mode,
        outcomes,
    }
}

fn remove_one<A: MemberOps + ?Sized>(api: &A, org: &str, entry: &DirectoryEntry) -> RemovalStatus {
    let login = entry.login.as_str();
    let result = match &entry.origin {
        Origin::OrgMember => {
            warn!(org, login, "removing organization member");
            api.remove_org_member(org, login)
        }
        Origin::OutsideCollaborator => {
            warn!(org, login, "removing outside collaborator");
            api.remove_outside_collaborator(org, login)
        }
        Origin::Unknown(tag) => {
            return RemovalStatus::Skipped(format!("unknown user type '{}'", tag));
        }
    };

    match result {
        Ok(()) => {
            info!(org, login, origin = %entry.origin, "removed");
            RemovalStatus::Removed
        }
        Err(e) => {
            warn!(org, login, origin = %entry.origin, error = %e, "removal failed");
            RemovalStatus::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(mode: RemovalMode, statuses: Vec<(&str, RemovalStatus)>) -> RemovalReport {
        RemovalReport {
            org: "acme".into(),
            mode,
            outcomes: statuses
                .into_iter()
                .map(|(login, status)| RemovalOutcome {
                    entry: DirectoryEntry::member(login),
                    status,
                })
                .collect(),
        }
    }

    #[test]
    fn test_decision_from_answer() {
        assert_eq!(Decision::from_answer("y\n"), Decision::Remove);
        assert_eq!(Decision::from_answer(" YES "), Decision::Remove);
        assert_eq!(Decision::from_answer("q"), Decision::Stop);
        assert_eq!(Decision::from_answer(""), Decision::Skip);
        assert_eq!(Decision::from_answer("n"), Decision::Skip);
        assert_eq!(Decision::from_answer("maybe"), Decision::Skip);
    }

    #[test]
    fn test_empty_report_display() {
        let r = report(RemovalMode::DryRun, vec![]);
        assert!(r.is_empty());
        assert_eq!(r.to_string(), "Nothing to remove from acme.");
    }

    #[test]
    fn test_dry_run_display() {
        let r = report(RemovalMode::DryRun, vec![("bob", RemovalStatus::Planned)]);
        let text = r.to_string();
        assert!(text.starts_with("[dry-run] 1 user(s) would be removed from acme:"));
        assert!(text.contains("1/1: bob (OrgMember) - would remove"));
        assert!(text.contains("no changes made"));
        assert_eq!(r.planned(), 1);
    }

    #[test]
    fn test_applied_counts() {
        let r = report(
            RemovalMode::Applied,
            vec![
                ("a", RemovalStatus::Removed),
                ("b", RemovalStatus::Failed("Not Found".into())),
                ("c", RemovalStatus::Skipped("unknown user type 'X'".into())),
                ("d", RemovalStatus::Removed),
            ],
        );
        assert_eq!(r.removed(), 2);
        assert_eq!(r.failed(), 1);
        assert_eq!(r.skipped(), 1);
        let text = r.to_string();
        assert!(text.contains("2/4: b (OrgMember) - FAILED: Not Found"));
        assert!(text.ends_with("2 removed, 1 failed, 1 skipped"));
    }
}
