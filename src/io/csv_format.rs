//! CSV format handling for replay operations and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvOperation structure for deserialization
//! - Conversion from CSV rows to domain operation records
//! - Account table serialization
//!
//! All functions are pure (no I/O on the parse side) for easy testing.

use crate::types::{Account, AccountId, ActorSpec, LedgerError, OpKind, OperationRecord, Platform};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Raw CSV row as deserialized from a replay file
///
/// Columns: `op, account, actor, request, amount, platform, level, at, note`.
/// All columns past `actor` are optional strings; which ones an operation
/// actually needs is decided by the engine, not here.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvOperation {
    pub op: String,
    pub account: AccountId,
    pub actor: String,
    pub request: Option<String>,
    pub amount: Option<String>,
    pub platform: Option<String>,
    pub level: Option<String>,
    pub at: Option<String>,
    pub note: Option<String>,
}

fn parse_optional<T: FromStr>(
    value: Option<String>,
    column: &str,
    op: &str,
) -> Result<Option<T>, String> {
    match value {
        Some(text) if !text.trim().is_empty() => text
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid {} '{}' for op '{}'", column, text, op)),
        _ => Ok(None),
    }
}

/// Convert a raw CSV row to an operation record
///
/// Parses the operation kind, the actor and the typed optional columns.
/// An empty `at` column defaults to instant 0. Missing columns required by
/// the specific operation are caught by the engine, so the parse stays
/// uniform across kinds.
///
/// # Errors
///
/// A message naming the offending column and operation.
pub fn convert_csv_operation(row: CsvOperation) -> Result<OperationRecord, String> {
    let op = row.op.trim().to_lowercase();
    let kind = op.parse::<OpKind>()?;
    let actor = row.actor.trim().to_lowercase().parse::<ActorSpec>()?;

    let request = parse_optional::<u64>(row.request, "request id", &op)?;
    let amount = parse_optional::<Decimal>(row.amount, "amount", &op)?;
    let platform = parse_optional::<Platform>(row.platform, "platform", &op)?;
    let level = parse_optional::<u8>(row.level, "level", &op)?;
    let at = parse_optional::<i64>(row.at, "timestamp", &op)?.unwrap_or(0);

    let note = row.note.filter(|text| !text.trim().is_empty());

    Ok(OperationRecord {
        kind,
        account: row.account,
        actor,
        request,
        amount,
        platform,
        level,
        at,
        note,
    })
}

/// Write the final account table to CSV
///
/// Columns: `account, balance, commission, total, deposited, tasks, level,
/// status`, sorted by account ID for deterministic output. Amounts are
/// written in whole currency units with no forced decimal places.
///
/// # Errors
///
/// I/O or CSV errors from the underlying writer.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer.write_record([
        "account",
        "balance",
        "commission",
        "total",
        "deposited",
        "tasks",
        "level",
        "status",
    ])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record(&[
            account.id.to_string(),
            account.balance.to_string(),
            account.commission.to_string(),
            account.total_balance().to_string(),
            account.deposited_total.to_string(),
            account.tasks_completed.to_string(),
            account.level.to_string(),
            account.status.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AdminRole;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn row(op: &str, actor: &str) -> CsvOperation {
        CsvOperation {
            op: op.to_string(),
            account: 1,
            actor: actor.to_string(),
            request: None,
            amount: None,
            platform: None,
            level: None,
            at: None,
            note: None,
        }
    }

    #[test]
    fn full_row_converts_to_a_typed_record() {
        let csv_row = CsvOperation {
            op: "task-complete".to_string(),
            account: 7,
            actor: "owner".to_string(),
            request: None,
            amount: None,
            platform: Some("shopee".to_string()),
            level: Some("2".to_string()),
            at: Some("86400".to_string()),
            note: None,
        };

        let record = convert_csv_operation(csv_row).unwrap();
        assert_eq!(record.kind, OpKind::TaskComplete);
        assert_eq!(record.account, 7);
        assert_eq!(record.actor, ActorSpec::Owner);
        assert_eq!(record.platform, Some(Platform::Shopee));
        assert_eq!(record.level, Some(2));
        assert_eq!(record.at, 86_400);
    }

    #[test]
    fn admin_actor_parses_with_its_role() {
        let record = convert_csv_operation(row("deposit-approve", "moderator")).unwrap();
        assert_eq!(record.actor, ActorSpec::Admin(AdminRole::Moderator));
    }

    #[test]
    fn op_and_actor_are_case_insensitive() {
        let record = convert_csv_operation(row("Deposit-Request", "OWNER")).unwrap();
        assert_eq!(record.kind, OpKind::DepositRequest);
        assert_eq!(record.actor, ActorSpec::Owner);
    }

    #[test]
    fn empty_optional_columns_become_none_and_at_defaults_to_zero() {
        let mut csv_row = row("credit", "owner");
        csv_row.amount = Some("50000".to_string());
        csv_row.request = Some("".to_string());
        csv_row.note = Some("  ".to_string());

        let record = convert_csv_operation(csv_row).unwrap();
        assert_eq!(record.amount, Some(dec!(50_000)));
        assert_eq!(record.request, None);
        assert_eq!(record.note, None);
        assert_eq!(record.at, 0);
    }

    #[rstest]
    #[case::unknown_op("account-merge", "owner", "unknown operation")]
    #[case::unknown_actor("credit", "intern", "unknown actor")]
    fn invalid_op_or_actor_is_rejected(
        #[case] op: &str,
        #[case] actor: &str,
        #[case] expected: &str,
    ) {
        let result = convert_csv_operation(row(op, actor));
        assert!(result.unwrap_err().contains(expected));
    }

    #[rstest]
    #[case::bad_amount(|r: &mut CsvOperation| r.amount = Some("lots".to_string()), "Invalid amount")]
    #[case::bad_level(|r: &mut CsvOperation| r.level = Some("first".to_string()), "Invalid level")]
    #[case::bad_platform(|r: &mut CsvOperation| r.platform = Some("ebay".to_string()), "Invalid platform")]
    #[case::bad_timestamp(|r: &mut CsvOperation| r.at = Some("noon".to_string()), "Invalid timestamp")]
    fn unparseable_columns_are_rejected(
        #[case] mutate: fn(&mut CsvOperation),
        #[case] expected: &str,
    ) {
        let mut csv_row = row("credit", "owner");
        mutate(&mut csv_row);
        let result = convert_csv_operation(csv_row);
        assert!(result.unwrap_err().contains(expected));
    }

    #[test]
    fn account_table_is_sorted_and_headers_match_the_wire_format() {
        let mut second = Account::new(2);
        second.balance = dec!(350_000);
        second.commission = dec!(2_200);
        second.deposited_total = dec!(400_000);
        second.tasks_completed = 1;
        second.level = 2;

        let accounts = vec![second, Account::new(1)];
        let mut output = Vec::new();
        write_accounts_csv(&accounts, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "account,balance,commission,total,deposited,tasks,level,status\n\
             1,0,0,0,0,0,1,active\n\
             2,350000,2200,352200,400000,1,2,active\n"
        );
    }

    #[test]
    fn empty_account_table_writes_only_the_header() {
        let mut output = Vec::new();
        write_accounts_csv(&[], &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "account,balance,commission,total,deposited,tasks,level,status\n"
        );
    }
}
