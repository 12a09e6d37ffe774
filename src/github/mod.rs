//! GitHub API integration for organization membership.
//!
//! This module provides a blocking client for the GitHub REST API to:
//! - List organization members and outside collaborators
//! - Remove members and outside collaborators
//! - Add or invite members
//!
//! # Example
//!
//! ```rust,no_run
//! use org_roster::github::{GitHubClient, MemberOps};
//!
//! let client = GitHubClient::new("ghp_your_token_here");
//!
//! for user in client.list_org_members("my-org")? {
//!     println!("{:?}", user.login);
//! }
//! # Ok::<(), org_roster::error::RosterError>(())
//! ```

mod client;
mod members;

pub use client::{DEFAULT_BASE_URL, GitHubClient, PER_PAGE};
pub use members::{MemberOps, Membership, OrgRole, OrgUser};
