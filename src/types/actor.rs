//! Acting identities and their capabilities
//!
//! Every workflow operation receives the caller's identity: either the
//! owning user of an account or an admin with a role. Admin rights are an
//! explicit capability set derived from the role by a pure function, so an
//! authorization decision is a plain slice lookup with no hidden state.

use super::account::AccountId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::LedgerError;

/// Admin identifier
pub type AdminId = u32;

/// Admin roles, ordered from most to least privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    /// Holds every capability
    SuperAdmin,
    /// Day-to-day administration, including account management
    Admin,
    /// May decide deposit and withdrawal requests, nothing else
    Moderator,
    /// Read-only support staff; holds no capability
    Support,
}

impl FromStr for AdminRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(AdminRole::SuperAdmin),
            "admin" => Ok(AdminRole::Admin),
            "moderator" => Ok(AdminRole::Moderator),
            "support" => Ok(AdminRole::Support),
            other => Err(LedgerError::unauthorized(&format!(
                "act under unknown role '{}'",
                other
            ))),
        }
    }
}

/// Things an admin can be allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Change account status and level
    ManageAccounts,
    /// Decide deposit requests
    ApproveDeposits,
    /// Decide and complete withdrawal requests
    ApproveWithdrawals,
}

/// Capability set for a role
///
/// Pure and total: the answer depends on the role alone.
pub fn role_capabilities(role: AdminRole) -> &'static [Capability] {
    match role {
        AdminRole::SuperAdmin | AdminRole::Admin => &[
            Capability::ManageAccounts,
            Capability::ApproveDeposits,
            Capability::ApproveWithdrawals,
        ],
        AdminRole::Moderator => &[Capability::ApproveDeposits, Capability::ApproveWithdrawals],
        AdminRole::Support => &[],
    }
}

/// The identity a workflow operation runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The user owning the given account
    Owner(AccountId),
    /// An admin acting under a role
    Admin {
        /// Admin ID, recorded in audit stamps
        id: AdminId,
        /// Role the admin acts under
        role: AdminRole,
    },
}

impl Actor {
    /// Identity of the user owning `account`
    pub fn owner(account: AccountId) -> Self {
        Actor::Owner(account)
    }

    /// Identity of an admin acting under `role`
    pub fn admin(id: AdminId, role: AdminRole) -> Self {
        Actor::Admin { id, role }
    }

    /// Whether this actor holds the capability
    ///
    /// Owners never hold admin capabilities.
    pub fn can(&self, capability: Capability) -> bool {
        match self {
            Actor::Owner(_) => false,
            Actor::Admin { role, .. } => role_capabilities(*role).contains(&capability),
        }
    }

    /// Whether this actor is the owner of `account`
    pub fn owns(&self, account: AccountId) -> bool {
        matches!(self, Actor::Owner(owned) if *owned == account)
    }

    /// The admin ID for audit stamping, if this is an admin
    pub fn admin_id(&self) -> Option<AdminId> {
        match self {
            Actor::Owner(_) => None,
            Actor::Admin { id, .. } => Some(*id),
        }
    }
}
