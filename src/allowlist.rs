//! Allow-list filtering: which directory entries are candidates for removal.

use std::collections::{BTreeSet, HashSet};

use tracing::info;

use crate::directory::{DirectoryEntry, fetch_entries};
use crate::error::Result;
use crate::github::MemberOps;

/// Logins that must never be removed.
///
/// GitHub logins are case-insensitive, so membership checks ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    logins: BTreeSet<String>,
}

impl AllowList {
    /// Build from logins; blank entries are dropped.
    pub fn new<I, S>(logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            logins: logins
                .into_iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    /// Whether `login` is allowed, ignoring case.
    pub fn contains(&self, login: &str) -> bool {
        self.logins.contains(&login.to_lowercase())
    }

    /// Number of distinct allowed logins.
    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }

    /// Allowed logins, lowercased and sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.logins.iter().map(String::as_str)
    }
}

/// Every entry whose login is not allowed, deduplicated by (login, origin).
///
/// Input order is preserved. The same login listed under two origins yields
/// two candidates, since each origin is removed through its own endpoint.
pub fn compute_removals(directory: &[DirectoryEntry], allowed: &AllowList) -> Vec<DirectoryEntry> {
    let mut seen = HashSet::new();
    directory
        .iter()
        .filter(|entry| !allowed.contains(&entry.login))
        .filter(|&entry| seen.insert((entry.login.as_str(), &entry.origin)))
        .cloned()
        .collect()
}

/// Fetch the directory and return the removal candidates for `org`.
pub fn removal_candidates<A: MemberOps + ?Sized>(
    api: &A,
    org: &str,
    allowed: &AllowList,
) -> Result<Vec<DirectoryEntry>> {
    let directory = fetch_entries(api, org)?;
    let candidates = compute_removals(&directory, allowed);
    info!(
        org,
        listed = directory.len(),
        allowed = allowed.len(),
        candidates = candidates.len(),
        "computed removal candidates"
    );
    Ok(candidates)
}
