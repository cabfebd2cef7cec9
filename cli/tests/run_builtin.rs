use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn run_builtin_prints_a_full_batch_result() {
    Command::cargo_bin("engine-sim")
        .unwrap()
        .args(["run", "--builtin", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_sims\": 100"))
        .stdout(predicate::str::contains("\"sim_data\""));
}

#[test]
fn narrate_builtin_prints_a_play_by_play_log_and_footer() {
    Command::cargo_bin("engine-sim")
        .unwrap()
        .args(["narrate", "--builtin", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Party:"))
        .stdout(predicate::str::contains("--- winner:"));
}

#[test]
fn run_without_builtin_or_party_reports_a_helpful_error() {
    Command::cargo_bin("engine-sim")
        .unwrap()
        .args(["run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--party is required"));
}
