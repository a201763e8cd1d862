//! Integration tests for zuluai
//!
//! This file contains end-to-end tests for the zuluai binary. None of them
//! reaches the model service: each run fails or finishes before the first
//! request.

mod helpers;

use assert_cmd::Command;
use predicates::prelude::*;

use helpers::*;

/// Command with a clean environment, running inside `dir`
fn zuluai(dir: &std::path::Path) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("zuluai")?;
    cmd.current_dir(dir)
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("ANTHROPIC_BASE_URL")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_missing_credential_fails_before_file_io() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;

    // The data file does not exist either; the credential error must win.
    let mut cmd = zuluai(temp_dir.path())?;
    cmd.args(["csv", "--data", "missing.csv"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "ANTHROPIC_API_KEY not found in environment variables.",
        ))
        .stderr(predicate::str::contains("missing.csv").not());

    Ok(())
}

#[test]
fn test_empty_credential_counts_as_missing() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;

    let mut cmd = zuluai(temp_dir.path())?;
    cmd.env("ANTHROPIC_API_KEY", "").args(["sql"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY not found"));

    Ok(())
}

#[test]
fn test_credential_is_read_from_dotenv_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    write_file(temp_dir.path(), ".env", "ANTHROPIC_API_KEY=test-key\n")?;

    let mut cmd = zuluai(temp_dir.path())?;
    cmd.args(["csv", "--data", "missing.csv"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found in environment variables").not())
        .stderr(predicate::str::contains("missing.csv"));

    Ok(())
}

#[test]
fn test_missing_file_reports_path_and_working_directory() -> Result<(), Box<dyn std::error::Error>>
{
    let temp_dir = create_temp_dir()?;

    let mut cmd = zuluai(temp_dir.path())?;
    cmd.env("ANTHROPIC_API_KEY", "test-key")
        .args(["csv", "--data", "data/salaries_2023.csv"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error loading dataset"))
        .stderr(predicate::str::contains(
            "The file 'data/salaries_2023.csv' was not found.",
        ))
        .stderr(predicate::str::contains("Current working directory:"));

    Ok(())
}

#[test]
fn test_empty_file_reports_empty() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    write_file(temp_dir.path(), "empty.csv", "")?;

    let mut cmd = zuluai(temp_dir.path())?;
    cmd.env("ANTHROPIC_API_KEY", "test-key")
        .args(["csv", "--data", "empty.csv"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("The file 'empty.csv' is empty."));

    Ok(())
}

#[test]
fn test_malformed_file_reports_invalid_data() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    write_file(
        temp_dir.path(),
        "bad.csv",
        "department,base_salary\nPolice,50000,1,2\n",
    )?;

    let mut cmd = zuluai(temp_dir.path())?;
    cmd.env("ANTHROPIC_API_KEY", "test-key")
        .args(["sql", "--data", "bad.csv", "--db", "db/salary.db"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("The file 'bad.csv' contains invalid data"));

    // Loading failed, so the store was never written.
    assert!(!temp_dir.path().join("db").exists());
    Ok(())
}

#[test]
fn test_interactive_chat_exits_on_sentinel() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;

    let mut cmd = zuluai(temp_dir.path())?;
    cmd.env("ANTHROPIC_API_KEY", "test-key")
        .args(["chat", "-i"])
        .write_stdin("EXIT\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Type 'exit' to quit."))
        .stdout(predicate::str::contains("AI:").not());

    Ok(())
}

#[test]
fn test_question_and_serve_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;

    let mut cmd = zuluai(temp_dir.path())?;
    cmd.env("ANTHROPIC_API_KEY", "test-key")
        .args(["sql", "-q", "How many?", "--serve", "127.0.0.1:0"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));

    Ok(())
}
