//! # Org Roster
//!
//! Administrative tooling for the membership of a GitHub organization.
//!
//! This crate provides:
//! - Listing organization members and outside collaborators as one directory
//! - Exporting that directory to a `login,type` CSV file
//! - Computing removal candidates against an allow-list
//! - Removing candidates, with dry-run as the default
//! - Adding or inviting members
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use org_roster::prelude::*;
//!
//! let client = GitHubClient::from_env()?;
//! let allowed = AllowList::new(["release-bot", "alice"]);
//!
//! let candidates = removal_candidates(&client, "my-org", &allowed)?;
//! let report = remove_users(&client, "my-org", &candidates, true);
//!
//! println!("{}", report);
//! # Ok::<(), org_roster::error::RosterError>(())
//! ```

pub mod allowlist;
pub mod config;
pub mod directory;
pub mod error;
pub mod github;
pub mod membership;
pub mod remover;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::allowlist::{AllowList, compute_removals, removal_candidates};
    pub use crate::config::Config;
    pub use crate::directory::{
        DirectoryEntry, Origin, dedupe_by_login, fetch_entries, list_directory, read_export,
        render_table, write_export,
    };
    pub use crate::error::{RosterError, Result};
    pub use crate::github::{GitHubClient, MemberOps, Membership, OrgRole, OrgUser};
    pub use crate::membership::{MembershipOutcome, add_members};
    pub use crate::remover::{
        Decision, RemovalMode, RemovalOutcome, RemovalReport, RemovalStatus, remove_users,
        remove_users_confirmed,
    };
}

pub use prelude::*;
