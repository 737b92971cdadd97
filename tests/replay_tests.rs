//! End-to-end replay tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Replays all operations through the engine
//! 3. Generates the account-table CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures live in tests/fixtures/ and cover:
//! - Deposit and withdrawal request lifecycles
//! - Task completion and the per-(platform, level) cooldown
//! - Withdrawal eligibility gates
//! - Admin capability enforcement
//! - Direct ledger credits/debits and the commission-first debit order
//! - Malformed rows and failed operations that must not stop a replay
//!
//! Each fixture runs twice: once with the synchronous strategy and once with
//! the async batch strategy.

#[cfg(test)]
mod tests {
    use rewards_ledger_engine::cli::StrategyType;
    use rewards_ledger_engine::strategy::create_strategy;
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// Replay a fixture's input.csv and compare against its expected.csv
    ///
    /// # Panics
    ///
    /// Panics if the fixture files cannot be read or the output does not
    /// match the expected account table.
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let strategy = create_strategy(strategy_type.clone(), None);

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("deposit_lifecycle")]
    #[case("withdraw_lifecycle")]
    #[case("task_cooldown")]
    #[case("eligibility_gates")]
    #[case("admin_controls")]
    #[case("ledger_ops")]
    #[case("malformed_rows")]
    #[case("multiple_accounts")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }
}
