//! Replay operation records
//!
//! A replay file is a CSV of operations applied to the ledger in order.
//! `OperationRecord` is the parsed row; the engine dispatches on `OpKind`
//! and pulls the optional columns each operation needs, rejecting rows
//! where a required column is missing.

use super::account::AccountId;
use super::actor::{Actor, AdminRole};
use super::request::RequestId;
use super::task::Platform;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Operation kinds accepted in a replay file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Create a deposit request
    DepositRequest,
    /// Approve a pending deposit, crediting the balance pool
    DepositApprove,
    /// Reject a pending deposit with a reason
    DepositReject,
    /// Owner cancels their own pending deposit
    DepositCancel,
    /// Create a withdrawal request; validates but moves no funds
    WithdrawRequest,
    /// Move a pending withdrawal into processing
    WithdrawApprove,
    /// Mark a processing withdrawal as paid out externally
    WithdrawComplete,
    /// Reject a withdrawal with a reason, refunding commission-first
    WithdrawReject,
    /// Owner cancels their own pending withdrawal
    WithdrawCancel,
    /// Record a task completion and credit its commission
    TaskComplete,
    /// Admin sets an account's level
    LevelSet,
    /// Admin sets an account's status
    StatusSet,
    /// Direct credit to a pool
    Credit,
    /// Direct commission-first debit
    Debit,
}

impl FromStr for OpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit-request" => Ok(OpKind::DepositRequest),
            "deposit-approve" => Ok(OpKind::DepositApprove),
            "deposit-reject" => Ok(OpKind::DepositReject),
            "deposit-cancel" => Ok(OpKind::DepositCancel),
            "withdraw-request" => Ok(OpKind::WithdrawRequest),
            "withdraw-approve" => Ok(OpKind::WithdrawApprove),
            "withdraw-complete" => Ok(OpKind::WithdrawComplete),
            "withdraw-reject" => Ok(OpKind::WithdrawReject),
            "withdraw-cancel" => Ok(OpKind::WithdrawCancel),
            "task-complete" => Ok(OpKind::TaskComplete),
            "level-set" => Ok(OpKind::LevelSet),
            "status-set" => Ok(OpKind::StatusSet),
            "credit" => Ok(OpKind::Credit),
            "debit" => Ok(OpKind::Debit),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpKind::DepositRequest => "deposit-request",
            OpKind::DepositApprove => "deposit-approve",
            OpKind::DepositReject => "deposit-reject",
            OpKind::DepositCancel => "deposit-cancel",
            OpKind::WithdrawRequest => "withdraw-request",
            OpKind::WithdrawApprove => "withdraw-approve",
            OpKind::WithdrawComplete => "withdraw-complete",
            OpKind::WithdrawReject => "withdraw-reject",
            OpKind::WithdrawCancel => "withdraw-cancel",
            OpKind::TaskComplete => "task-complete",
            OpKind::LevelSet => "level-set",
            OpKind::StatusSet => "status-set",
            OpKind::Credit => "credit",
            OpKind::Debit => "debit",
        };
        write!(f, "{}", s)
    }
}

/// Caller identity as written in a replay row
///
/// Replay files carry no admin IDs; an admin actor resolves to a fixed
/// audit ID of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorSpec {
    /// The owner of the row's account
    Owner,
    /// An admin acting under the given role
    Admin(AdminRole),
}

impl ActorSpec {
    /// Audit ID stamped for replay admins
    pub const REPLAY_ADMIN_ID: u32 = 1;

    /// Bind this spec to the row's account, yielding a concrete actor
    pub fn resolve(&self, account: AccountId) -> Actor {
        match self {
            ActorSpec::Owner => Actor::owner(account),
            ActorSpec::Admin(role) => Actor::admin(Self::REPLAY_ADMIN_ID, *role),
        }
    }
}

impl FromStr for ActorSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "owner" {
            return Ok(ActorSpec::Owner);
        }
        s.parse::<AdminRole>()
            .map(ActorSpec::Admin)
            .map_err(|_| format!("unknown actor: {}", s))
    }
}

/// One parsed replay row
///
/// Optional columns are validated per operation kind by the engine, not
/// at parse time, so a row's error carries the operation it belongs to.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    /// Operation kind
    pub kind: OpKind,

    /// Account the operation targets
    pub account: AccountId,

    /// Identity the operation runs under
    pub actor: ActorSpec,

    /// Request ID, for operations that transition an existing request
    pub request: Option<RequestId>,

    /// Amount in whole currency units
    pub amount: Option<Decimal>,

    /// Platform, for task completions
    pub platform: Option<Platform>,

    /// Level, for task completions and level-set
    pub level: Option<u8>,

    /// Simulated instant of the operation, seconds since the Unix epoch
    pub at: i64,

    /// Free-form column: rejection reason, bank name, status, or pool
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("deposit-request", OpKind::DepositRequest)]
    #[case("withdraw-complete", OpKind::WithdrawComplete)]
    #[case("task-complete", OpKind::TaskComplete)]
    #[case("status-set", OpKind::StatusSet)]
    fn op_kinds_round_trip_their_wire_form(#[case] text: &str, #[case] kind: OpKind) {
        assert_eq!(text.parse::<OpKind>().unwrap(), kind);
        assert_eq!(kind.to_string(), text);
    }

    #[test]
    fn unknown_op_kind_is_rejected() {
        assert!("account-merge".parse::<OpKind>().is_err());
    }

    #[test]
    fn actor_specs_resolve_against_the_row_account() {
        assert_eq!("owner".parse::<ActorSpec>().unwrap().resolve(7), Actor::owner(7));
        let admin = "moderator".parse::<ActorSpec>().unwrap().resolve(7);
        assert_eq!(
            admin,
            Actor::admin(ActorSpec::REPLAY_ADMIN_ID, AdminRole::Moderator)
        );
    }

    #[test]
    fn unknown_actor_is_rejected() {
        assert!("intern".parse::<ActorSpec>().is_err());
    }
}
