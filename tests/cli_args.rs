//! Integration tests for CLI argument handling
//!
//! Only exercises paths that finish before any request is sent: help
//! output, offline policy tables, and argument validation.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_aidscope"))
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to execute aidscope")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aidscope"), "Help should mention aidscope");
    assert!(stdout.contains("rate-context"), "Help should list subcommands");
    assert!(stdout.contains("autocomplete"), "Help should list subcommands");
}

#[test]
fn test_policy_prints_current_award_year() {
    let output = run_cli(&["policy"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2024-2025"));
    assert!(stdout.contains("loanRates"));
}

#[test]
fn test_policy_unknown_year_fails() {
    let output = run_cli(&["policy", "--year", "1999-2000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown award year"), "stderr was: {}", stderr);
}

#[test]
fn test_invalid_date_prints_error_and_exits() {
    let output = run_cli(&["rates", "--start", "2024-13-01"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid date"), "stderr was: {}", stderr);
}

#[test]
fn test_invalid_sort_prints_error_and_exits() {
    let output = run_cli(&["schools", "--sort", "school.name:sideways"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid sort"), "stderr was: {}", stderr);
}

#[test]
fn test_zero_years_rejected() {
    let output = run_cli(&["cpi-history", "--years", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid years"), "stderr was: {}", stderr);
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use aidscope::cli::{parse_sort_order, Cli, CliError, Command};
    use aidscope::data::SortOrder;
    use clap::Parser;

    #[test]
    fn test_cli_parse_near_zip_with_distance() {
        let cli = Cli::parse_from(["aidscope", "near-zip", "02139", "--distance", "25"]);
        match cli.command {
            Command::NearZip { zip, distance, .. } => {
                assert_eq!(zip, "02139");
                assert_eq!(distance, Some(25));
            }
            other => panic!("Expected NearZip, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_observations_range() {
        let cli = Cli::parse_from([
            "aidscope",
            "observations",
            "UNRATE",
            "--start",
            "2020-01-01",
            "--order",
            "desc",
        ]);
        match cli.command {
            Command::Observations { id, range } => {
                assert_eq!(id, "UNRATE");
                let query = range.observation_query().unwrap();
                assert_eq!(query.sort_order, Some(SortOrder::Desc));
                assert!(query.start_date.is_some());
            }
            other => panic!("Expected Observations, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_school_requires_numeric_id() {
        assert!(Cli::try_parse_from(["aidscope", "school", "harvard"]).is_err());
    }

    #[test]
    fn test_parse_sort_order_error_message() {
        let err = parse_sort_order("sideways").unwrap_err();
        assert_eq!(err, CliError::InvalidSortOrder("sideways".to_string()));
        assert!(err.to_string().contains("asc, desc"));
    }
}
