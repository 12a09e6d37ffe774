//! Organization membership endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RosterError, Result};
use crate::github::GitHubClient;

/// A user record from a member or collaborator listing.
///
/// `login` is optional so that a malformed item can be reported and skipped
/// instead of failing the whole page.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OrgUser {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
}

impl OrgUser {
    /// User record with just a login.
    pub fn named(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            id: None,
        }
    }
}

/// Role granted by an organization membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    #[default]
    Member,
    Admin,
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgRole::Member => write!(f, "member"),
            OrgRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for OrgRole {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "member" => Ok(OrgRole::Member),
            "admin" => Ok(OrgRole::Admin),
            other => Err(RosterError::InvalidConfig(format!(
                "unknown role '{}', expected 'member' or 'admin'",
                other
            ))),
        }
    }
}

/// Membership as returned by `PUT /orgs/{org}/memberships/{login}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Membership {
    /// `active`, or `pending` while an invitation is outstanding.
    pub state: String,
    pub role: String,
}

/// Membership listing and mutation operations.
pub trait MemberOps {
    /// Login of the user the credentials belong to.
    fn authenticated_login(&self) -> Result<String>;

    /// List every member of an organization.
    fn list_org_members(&self, org: &str) -> Result<Vec<OrgUser>>;

    /// List every outside collaborator of an organization.
    fn list_outside_collaborators(&self, org: &str) -> Result<Vec<OrgUser>>;

    /// Remove a member from an organization.
    fn remove_org_member(&self, org: &str, login: &str) -> Result<()>;

    /// Remove an outside collaborator from every repository in an organization.
    fn remove_outside_collaborator(&self, org: &str, login: &str) -> Result<()>;

    /// Add a user to an organization, or update their role. Non-members
    /// receive an invitation.
    fn set_membership(&self, org: &str, login: &str, role: OrgRole) -> Result<Membership>;
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl MemberOps for GitHubClient {
    fn authenticated_login(&self) -> Result<String> {
        let user: OrgUser = self.get("/user")?;
        user.login.ok_or_else(|| RosterError::MalformedResponse {
            endpoint: "/user".into(),
            message: "missing login field".into(),
        })
    }

    fn list_org_members(&self, org: &str) -> Result<Vec<OrgUser>> {
        self.get_paginated(&format!("/orgs/{}/members", segment(org)))
    }

    fn list_outside_collaborators(&self, org: &str) -> Result<Vec<OrgUser>> {
        self.get_paginated(&format!("/orgs/{}/outside_collaborators", segment(org)))
    }

    fn remove_org_member(&self, org: &str, login: &str) -> Result<()> {
        self.delete(&format!("/orgs/{}/members/{}", segment(org), segment(login)))
    }

    fn remove_outside_collaborator(&self, org: &str, login: &str) -> Result<()> {
        self.delete(&format!(
            "/orgs/{}/outside_collaborators/{}",
            segment(org),
            segment(login)
        ))
    }

    fn set_membership(&self, org: &str, login: &str, role: OrgRole) -> Result<Membership> {
        #[derive(Serialize)]
        struct Body {
            role: OrgRole,
        }

        self.put(
            &format!("/orgs/{}/memberships/{}", segment(org), segment(login)),
            &Body { role },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_user_missing_login() {
        let users: Vec<OrgUser> =
            serde_json::from_str(r#"[{"login":"alice","id":1},{"id":2},{"login":null}]"#).unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].login.as_deref(), Some("alice"));
        assert_eq!(users[1].login, None);
        assert_eq!(users[2].login, None);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<OrgRole>().unwrap(), OrgRole::Admin);
        assert_eq!("member".parse::<OrgRole>().unwrap(), OrgRole::Member);
        assert!("owner".parse::<OrgRole>().is_err());
        assert_eq!(serde_json::to_string(&OrgRole::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_membership_parse() {
        let m: Membership = serde_json::from_str(
            r#"{"state":"pending","role":"member","url":"https://api.github.com/orgs/o/memberships/u"}"#,
        )
        .unwrap();
        assert_eq!(m.state, "pending");
        assert_eq!(m.role, "member");
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("my org"), "my%20org");
        assert_eq!(segment("alice"), "alice");
    }
}
