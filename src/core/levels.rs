//! Level and commission-rate table
//!
//! A static five-level table: each level carries the per-task commission
//! rate and the thresholds (cumulative deposits, completed tasks) required
//! to unlock it. The table only answers questions; levels never advance by
//! themselves.

use crate::types::{Account, LedgerError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Lowest supported level
pub const MIN_LEVEL: u8 = 1;
/// Highest supported level
pub const MAX_LEVEL: u8 = 5;

/// Thresholds an account must reach before a level can be unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelRequirement {
    /// Cumulative completed deposits required
    pub deposited: Decimal,
    /// Completed tasks required
    pub tasks: u32,
}

const COMMISSION_RATES: [Decimal; 5] = [
    dec!(1500),
    dec!(2200),
    dec!(3300),
    dec!(4000),
    dec!(5500),
];

const REQUIREMENTS: [LevelRequirement; 5] = [
    LevelRequirement {
        deposited: dec!(0),
        tasks: 0,
    },
    LevelRequirement {
        deposited: dec!(500_000),
        tasks: 10,
    },
    LevelRequirement {
        deposited: dec!(2_000_000),
        tasks: 50,
    },
    LevelRequirement {
        deposited: dec!(5_000_000),
        tasks: 200,
    },
    LevelRequirement {
        deposited: dec!(10_000_000),
        tasks: 500,
    },
];

/// Commission awarded for one task at the given level
///
/// # Errors
///
/// Returns [`LedgerError::InvalidLevel`] outside the 1-5 window.
pub fn commission_rate(level: u8) -> Result<Decimal, LedgerError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(LedgerError::invalid_level(level));
    }
    Ok(COMMISSION_RATES[usize::from(level - 1)])
}

/// Unlock thresholds for the given level
///
/// # Errors
///
/// Returns [`LedgerError::InvalidLevel`] outside the 1-5 window.
pub fn requirement(level: u8) -> Result<LevelRequirement, LedgerError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(LedgerError::invalid_level(level));
    }
    Ok(REQUIREMENTS[usize::from(level - 1)])
}

/// Whether the account currently satisfies the unlock conditions for `level`
///
/// True only for levels above the account's current one whose deposit and
/// task thresholds are both met. Unlocking is a question, not an action:
/// the level itself moves only through an administrative update.
pub fn can_unlock(account: &Account, level: u8) -> bool {
    let Ok(required) = requirement(level) else {
        return false;
    };

    level > account.level
        && account.deposited_total >= required.deposited
        && account.tasks_completed >= required.tasks
}

/// One row of the per-account level overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelOverview {
    /// Level this row describes
    pub level: u8,
    /// Commission per task at this level
    pub commission_rate: Decimal,
    /// Unlock thresholds
    pub requirement: LevelRequirement,
    /// Whether the account already holds this level (or a higher one)
    pub unlocked: bool,
    /// Whether the account currently meets the unlock conditions
    pub can_unlock: bool,
}

/// Level table as seen from one account's progress
pub fn level_overview(account: &Account) -> Vec<LevelOverview> {
    (MIN_LEVEL..=MAX_LEVEL)
        .map(|level| LevelOverview {
            level,
            // Lookups cannot fail inside the 1-5 loop
            commission_rate: COMMISSION_RATES[usize::from(level - 1)],
            requirement: REQUIREMENTS[usize::from(level - 1)],
            unlocked: account.level >= level,
            can_unlock: can_unlock(account, level),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn account_at(level: u8, deposited: Decimal, tasks: u32) -> Account {
        let mut account = Account::new(1);
        account.level = level;
        account.deposited_total = deposited;
        account.tasks_completed = tasks;
        account
    }

    #[rstest]
    #[case(1, dec!(1500))]
    #[case(2, dec!(2200))]
    #[case(3, dec!(3300))]
    #[case(4, dec!(4000))]
    #[case(5, dec!(5500))]
    fn commission_rates_match_the_table(#[case] level: u8, #[case] rate: Decimal) {
        assert_eq!(commission_rate(level).unwrap(), rate);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn out_of_range_levels_are_rejected(#[case] level: u8) {
        assert_eq!(
            commission_rate(level),
            Err(LedgerError::invalid_level(level))
        );
        assert_eq!(requirement(level), Err(LedgerError::invalid_level(level)));
    }

    #[rstest]
    #[case(1, dec!(0), 0)]
    #[case(2, dec!(500_000), 10)]
    #[case(3, dec!(2_000_000), 50)]
    #[case(4, dec!(5_000_000), 200)]
    #[case(5, dec!(10_000_000), 500)]
    fn requirements_match_the_table(
        #[case] level: u8,
        #[case] deposited: Decimal,
        #[case] tasks: u32,
    ) {
        assert_eq!(
            requirement(level).unwrap(),
            LevelRequirement { deposited, tasks }
        );
    }

    #[test]
    fn can_unlock_needs_both_thresholds() {
        let deposits_only = account_at(1, dec!(500_000), 9);
        assert!(!can_unlock(&deposits_only, 2));

        let tasks_only = account_at(1, dec!(499_999), 10);
        assert!(!can_unlock(&tasks_only, 2));

        let both = account_at(1, dec!(500_000), 10);
        assert!(can_unlock(&both, 2));
    }

    #[test]
    fn can_unlock_is_false_for_held_and_lower_levels() {
        let account = account_at(3, dec!(10_000_000), 500);
        assert!(!can_unlock(&account, 3));
        assert!(!can_unlock(&account, 2));
        assert!(can_unlock(&account, 4));
        assert!(can_unlock(&account, 5));
    }

    #[test]
    fn can_unlock_does_not_require_passing_through_levels() {
        // A level-1 account meeting level-5 thresholds may unlock 5 directly.
        let account = account_at(1, dec!(10_000_000), 500);
        assert!(can_unlock(&account, 5));
    }

    #[test]
    fn overview_reports_progress_per_level() {
        let account = account_at(2, dec!(2_000_000), 50);
        let overview = level_overview(&account);

        assert_eq!(overview.len(), 5);
        assert!(overview[0].unlocked);
        assert!(overview[1].unlocked);
        assert!(!overview[2].unlocked);
        assert!(overview[2].can_unlock);
        assert!(!overview[3].can_unlock);
        assert_eq!(overview[4].commission_rate, dec!(5500));
        assert_eq!(overview[4].requirement.tasks, 500);
    }
}
