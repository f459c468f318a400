use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn overhead(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("overhead").unwrap();
    cmd.env("HOME", home);
    cmd
}

fn init(home: &Path) {
    overhead(home)
        .args(["init", "--data-dir"])
        .arg(home.join("data"))
        .assert()
        .success();
}

#[test]
fn init_creates_database() {
    let home = tempfile::tempdir().unwrap();
    overhead(home.path())
        .args(["init", "--data-dir"])
        .arg(home.path().join("data"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Database"));
    assert!(home.path().join("data").join("overhead.db").exists());
}

#[test]
fn demo_seeds_a_browsable_company() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    overhead(home.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Try these next"));

    // Running demo again must not duplicate the sheet
    overhead(home.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("already loaded"));

    overhead(home.path())
        .args(["jobs", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1001"));

    overhead(home.path())
        .args(["dashboard", "--period", "year"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revenue"));

    overhead(home.path())
        .args(["customers", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("customer(s)"));

    overhead(home.path())
        .args(["techs", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dan Weaver"));

    overhead(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jobs"));
}

#[test]
fn job_lifecycle_from_add_to_trash() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    overhead(home.path())
        .args(["techs", "add", "Sam Porter", "--rate", "0.4"])
        .assert()
        .success();

    overhead(home.path())
        .args([
            "jobs",
            "add",
            "--client",
            "Maple Ridge HOA",
            "--technician",
            "Sam Porter",
            "--sales",
            "600",
            "--date",
            "2026-01-15",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added job #1"));

    overhead(home.path())
        .args(["jobs", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Maple Ridge HOA"))
        .stdout(predicate::str::contains("$600.00"))
        .stdout(predicate::str::contains("$240.00"));

    overhead(home.path())
        .args(["jobs", "status", "1", "in progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("In Progress"));

    overhead(home.path())
        .args(["jobs", "status", "1", "On Hold"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("On Hold"));

    overhead(home.path())
        .args(["jobs", "delete", "1"])
        .assert()
        .success();

    overhead(home.path())
        .args(["jobs", "trash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Maple Ridge HOA"));

    overhead(home.path())
        .args(["jobs", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No jobs found."));

    overhead(home.path())
        .args(["jobs", "restore", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New Lead"));
}

#[test]
fn unknown_period_is_an_error() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    overhead(home.path())
        .args(["dashboard", "--period", "quarter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("period must be"));
}

#[test]
fn import_detects_duplicate_files() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    let sheet = home.path().join("jobs.csv");
    std::fs::write(
        &sheet,
        "Count,Date,Client Name,Technician,Status,Sales\n\
         2001,1/5/24,Rivera Garage,Sam Porter,Closed,450\n\
         2002,1/6/24,Chen Residence,Sam Porter,New Lead,\n",
    )
    .unwrap();

    overhead(home.path())
        .arg("import")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 imported"));

    overhead(home.path())
        .arg("import")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));

    // Forced re-import parses again but row-level dedup skips everything
    overhead(home.path())
        .arg("import")
        .arg(&sheet)
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 skipped"));

    overhead(home.path())
        .args(["jobs", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rivera Garage"))
        .stdout(predicate::str::contains("2 job(s)"));
}

#[test]
fn export_round_trip_covers_the_sheet() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    overhead(home.path())
        .args(["jobs", "add", "--client", "Chen Residence", "--sales", "325"])
        .assert()
        .success();

    let out = home.path().join("export.csv");
    overhead(home.path())
        .args(["export", "jobs"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 jobs"));

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.contains("Client Name"));
    assert!(contents.contains("Chen Residence"));
}

#[test]
fn stage_and_supply_management() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    overhead(home.path())
        .args(["stages", "add", "Warranty Visit", "--color", "#3B82F6"])
        .assert()
        .success();

    overhead(home.path())
        .args(["stages", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warranty Visit"));

    overhead(home.path())
        .args([
            "supplies",
            "add",
            "Torsion Spring 0.250",
            "--category",
            "Springs",
            "--purchase-price",
            "28.50",
            "--stock",
            "2",
            "--min-stock",
            "4",
        ])
        .assert()
        .success();

    overhead(home.path())
        .args(["supplies", "low"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Torsion Spring 0.250"));
}
