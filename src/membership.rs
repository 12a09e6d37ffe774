//! Adding users to an organization.

use tracing::{info, warn};

use crate::github::{MemberOps, Membership, OrgRole};

/// Result of adding one login.
#[derive(Debug)]
pub struct MembershipOutcome {
    pub login: String,
    pub result: Result<Membership, String>,
}

impl MembershipOutcome {
    /// True when GitHub sent an invitation rather than adding the user directly.
    pub fn is_invitation(&self) -> bool {
        matches!(&self.result, Ok(m) if m.state == "pending")
    }
}

/// Add each login to `org` with `role`. Failures are recorded per login.
pub fn add_members<A: MemberOps + ?Sized>(
    api: &A,
    org: &str,
    logins: &[String],
    role: OrgRole,
) -> Vec<MembershipOutcome> {
    logins
        .iter()
        .map(|login| {
            let result = match api.set_membership(org, login, role) {
                Ok(membership) => {
                    info!(org, login = %login, state = %membership.state, role = %membership.role, "membership set");
                    Ok(membership)
                }
                Err(e) => {
                    warn!(org, login = %login, error = %e, "failed to set membership");
                    Err(e.to_string())
                }
            };
            MembershipOutcome {
                login: login.clone(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_invitation() {
        let pending = MembershipOutcome {
            login: "zoe".into(),
            result: Ok(Membership {
                state: "pending".into(),
                role: "member".into(),
            }),
        };
        let active = MembershipOutcome {
            login: "yan".into(),
            result: Ok(Membership {
                state: "active".into(),
                role: "admin".into(),
            }),
        };
        let failed = MembershipOutcome {
            login: "xi".into(),
            result: Err("Not Found".into()),
        };

        assert!(pending.is_invitation());
        assert!(!active.is_invitation());
        assert!(!failed.is_invitation());
    }
}
