use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NOW: &str = "2025-04-03 12:00";

fn spendwise(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spendwise").unwrap();
    cmd.env("SPENDWISE_DATA_DIR", dir.path())
        .env("SPENDWISE_NOW", NOW)
        .env_remove("RUST_LOG");
    cmd
}

fn add_april_plan(dir: &TempDir) {
    spendwise(dir)
        .args(["plan", "add", "April", "--budget", "1000", "--savings", "100"])
        .args(["--start", "2025-04-01", "--end", "2025-04-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan: April"))
        .stdout(predicate::str::contains("Daily limit: $90"));
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();

    spendwise(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("plans.json").exists());
}

#[test]
fn test_plan_add_and_list() {
    let dir = TempDir::new().unwrap();
    add_april_plan(&dir);

    spendwise(&dir)
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("April"))
        .stdout(predicate::str::contains("Current"));
}

#[test]
fn test_overlapping_plan_is_rejected() {
    let dir = TempDir::new().unwrap();
    add_april_plan(&dir);

    spendwise(&dir)
        .args(["plan", "add", "Clash", "--budget", "500"])
        .args(["--start", "2025-04-10", "--end", "2025-04-20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlaps"));

    spendwise(&dir)
        .args(["plan", "suggest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next free range: 2025-04-11"));
}

#[test]
fn test_today_reflects_carry_over() {
    let dir = TempDir::new().unwrap();
    add_april_plan(&dir);

    spendwise(&dir)
        .args(["expense", "add", "120", "-c", "Food", "-d", "2025-04-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged $120 for Food on 2025-04-01"));
    spendwise(&dir)
        .args(["expense", "add", "30", "-c", "Food"])
        .assert()
        .success();

    spendwise(&dir)
        .arg("today")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available today: $120"))
        .stdout(predicate::str::contains("Day 3 of 10"));
}

#[test]
fn test_expense_validation() {
    let dir = TempDir::new().unwrap();

    spendwise(&dir)
        .args(["expense", "add", "0", "-c", "Food"])
        .assert()
        .failure();

    spendwise(&dir)
        .args(["expense", "add", "abc", "-c", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));

    spendwise(&dir)
        .args(["expense", "add", "9223372036854775807", "-c", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot exceed"));
}

#[test]
fn test_calendar_json() {
    let dir = TempDir::new().unwrap();
    add_april_plan(&dir);

    spendwise(&dir)
        .args(["calendar", "--month", "2025-04", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_today\": true"));

    spendwise(&dir)
        .args(["calendar", "--month", "2025-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("April 2025"));
}

#[test]
fn test_recurring_materialize_is_idempotent() {
    let dir = TempDir::new().unwrap();
    add_april_plan(&dir);

    spendwise(&dir)
        .args(["recurring", "add", "5", "-c", "Coffee", "--every", "daily"])
        .args(["--start", "2025-04-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created recurring expense: $5 Coffee"));

    spendwise(&dir)
        .arg("materialize")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 3 expense(s)"));

    spendwise(&dir)
        .arg("materialize")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 0 expense(s)"));

    spendwise(&dir)
        .args(["expense", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 expense(s), $15 against budget"));
}

#[test]
fn test_config_set_and_show() {
    let dir = TempDir::new().unwrap();

    spendwise(&dir)
        .args(["config", "currency_symbol", "€"])
        .assert()
        .success();

    spendwise(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("currency_symbol:   €"));

    spendwise(&dir)
        .args(["config", "nonsense", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}
