/// End-to-end tests for the CLI
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const RULES: &str = "tests/fixtures/rules.yaml";
const INVENTORY: &str = "tests/fixtures/inventory";
const SNAPSHOT: &str = "20240101T000000Z";

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: Success - normal execution
    #[test]
    fn test_exit_code_success() {
        cargo_bin_cmd!("iam-scan")
            .args(["-r", RULES, "-i", INVENTORY, "-m", "model_1", "-t", SNAPSHOT])
            .assert()
            .code(0);
    }

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("iam-scan").arg("--help").assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("iam-scan").arg("--version").assert().code(0);
    }

    /// Exit code 1: The data model holds no IAM policies
    #[test]
    fn test_exit_code_no_policies() {
        cargo_bin_cmd!("iam-scan")
            .args(["-r", RULES, "-i", INVENTORY, "-m", "empty_model"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No policies found"));
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("iam-scan")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: No rule book given
    #[test]
    fn test_exit_code_missing_rules() {
        cargo_bin_cmd!("iam-scan")
            .args(["-i", INVENTORY, "-m", "model_1"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--rules"));
    }

    /// Exit code 2: Malformed snapshot timestamp
    #[test]
    fn test_exit_code_invalid_timestamp() {
        cargo_bin_cmd!("iam-scan")
            .args(["-r", RULES, "-i", INVENTORY, "-m", "model_1", "-t", "yesterday"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid snapshot timestamp"));
    }

    /// Exit code 3: Application error - unknown data model
    #[test]
    fn test_exit_code_application_error_unknown_model() {
        cargo_bin_cmd!("iam-scan")
            .args(["-r", RULES, "-i", INVENTORY, "-m", "no_such_model"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Inventory snapshot not found"));
    }

    /// Exit code 3: Application error - rule book cannot be read
    #[test]
    fn test_exit_code_application_error_missing_rule_book() {
        cargo_bin_cmd!("iam-scan")
            .args(["-r", "tests/fixtures/absent.yaml", "-i", INVENTORY, "-m", "model_1"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Invalid rule book"));
    }
}

#[test]
fn test_e2e_writes_csv_to_output_path() {
    let output_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("iam-scan")
        .args(["-r", RULES, "-i", INVENTORY, "-m", "model_1", "-t", SNAPSHOT])
        .args(["-o", output_dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Violations: 3"));

    let csv_files: Vec<_> = fs::read_dir(output_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("scanner_output_iam.")
        })
        .collect();
    assert_eq!(csv_files.len(), 1);

    let csv = fs::read_to_string(&csv_files[0]).unwrap();
    assert!(csv.starts_with("resource_id,resource_type,full_name,"));
    assert!(csv.contains("user:evil@gmail.com"));
    assert!(csv.contains("allUsers"));
    assert!(csv.contains("group:auditors@company.com"));
}

#[test]
fn test_e2e_without_output_path_writes_no_csv() {
    let output_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("iam-scan")
        .current_dir(output_dir.path())
        .args([
            "-r",
            &format!("{}/{}", env!("CARGO_MANIFEST_DIR"), RULES),
            "-i",
            &format!("{}/{}", env!("CARGO_MANIFEST_DIR"), INVENTORY),
            "-m",
            "model_1",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("CSV:").not());

    assert_eq!(fs::read_dir(output_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_e2e_violation_store() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("violations.jsonl");

    cargo_bin_cmd!("iam-scan")
        .args(["-r", RULES, "-i", INVENTORY, "-m", "model_1", "-t", SNAPSHOT])
        .args(["--violations-db", store.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&store).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.contains(SNAPSHOT));

    // A second scan gets its own scan id, so nothing is rejected
    cargo_bin_cmd!("iam-scan")
        .args(["-r", RULES, "-i", INVENTORY, "-m", "model_1", "-t", SNAPSHOT])
        .args(["--violations-db", store.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("not saved").not());

    let content = fs::read_to_string(&store).unwrap();
    assert_eq!(content.lines().count(), 6);
}

#[test]
fn test_e2e_mail_settings_need_api_key() {
    cargo_bin_cmd!("iam-scan")
        .env_remove("SENDGRID_API_KEY")
        .args(["-r", RULES, "-i", INVENTORY, "-m", "model_1"])
        .args([
            "--email-sender",
            "scanner@example.com",
            "--email-recipient",
            "security@example.com",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SendGrid API key"));
}
