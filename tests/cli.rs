use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn cabinet(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cabinet").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--config-dir")
        .arg(dir)
        .arg("--data-file")
        .arg(dir.join("cabinet.db"));
    cmd
}

fn create(dir: &Path, first: &str, last: &str, dob: &str) {
    cabinet(dir)
        .args(["create", "--first-name", first, "--last-name", last])
        .args(["--date-of-birth", dob, "--age", "33", "--salary", "50000.00"])
        .args(["--gender", "F"])
        .assert()
        .success();
}

#[test]
fn create_list_find_stat() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    cabinet(dir)
        .args(["create", "--first-name", "Jane", "--last-name", "Doe"])
        .args(["--date-of-birth", "1990-05-01", "--age", "33"])
        .args(["--salary", "50000.00", "--gender", "F"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Record #1 is created."));
    create(dir, "John", "Roe", "1985-01-15");

    cabinet(dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane").and(predicate::str::contains("John")));

    cabinet(dir)
        .args(["find", "lastname", "roe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("John").and(predicate::str::contains("Jane").not()));

    cabinet(dir)
        .args(["find", "dateofbirth", "05/01/1990"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"));

    cabinet(dir)
        .arg("stat")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 record(s), 0 deleted."));
}

#[test]
fn remove_then_purge() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    create(dir, "Jane", "Doe", "1990-05-01");
    create(dir, "John", "Roe", "1985-01-15");
    create(dir, "Mary", "Poe", "1979-11-30");

    cabinet(dir)
        .args(["remove", "#2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Record #2 is removed."));

    cabinet(dir)
        .arg("stat")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 record(s), 1 deleted."));

    cabinet(dir)
        .arg("purge")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 3 records were purged."));

    cabinet(dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("John").not());
}

#[test]
fn validation_failure_exits_nonzero() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    cabinet(dir)
        .args(["create", "--first-name", "J", "--last-name", "Doe"])
        .args(["--date-of-birth", "1990-05-01", "--age", "33"])
        .args(["--salary", "50000.00", "--gender", "F"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("First name must be between 2 and 60"));

    cabinet(dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("The cabinet is empty."));
}

#[test]
fn editing_missing_record_fails() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    cabinet(dir)
        .args(["edit", "7", "--first-name", "Jane", "--last-name", "Doe"])
        .args(["--date-of-birth", "1990-05-01", "--age", "33"])
        .args(["--salary", "50000.00", "--gender", "F"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record #7 doesn't exist"));
}

#[test]
fn export_and_import_between_cabinets() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    create(source.path(), "Jane", "Doe", "1990-05-01");
    create(source.path(), "John", "Roe", "1985-01-15");

    let export = source.path().join("out.xml");
    cabinet(source.path())
        .arg("export")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("All records are exported"));

    cabinet(source.path())
        .arg("export")
        .arg(&export)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cabinet(target.path())
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 records were imported"));

    cabinet(target.path())
        .args(["find", "firstname", "JOHN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Roe"));
}

#[test]
fn generate_writes_importable_csv() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let out = dir.join("gen.csv");

    cabinet(dir)
        .arg("generate")
        .arg(&out)
        .args(["--start-id", "10", "--count", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 records were written"));

    cabinet(dir)
        .arg("import")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 records were imported"));
}

#[test]
fn generate_refuses_ids_past_the_largest() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    let out = dir.join("gen.csv");

    cabinet(dir)
        .arg("generate")
        .arg(&out)
        .args(["--start-id", "4294967295", "--count", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run past the largest id"));
    assert!(!out.exists());
}

#[test]
fn query_commands() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    create(dir, "Jane", "Doe", "1990-05-01");
    create(dir, "John", "Doe", "1985-01-15");
    create(dir, "Ann", "Roe", "1970-03-03");

    cabinet(dir)
        .args(["update", "set", "age=40", "where", "lastname='Doe'"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 record(s) updated."));

    cabinet(dir)
        .args(["select", "id,", "firstname", "where", "age=40", "and", "firstname=John"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("| id | firstname |")
                .and(predicate::str::contains("| 2  | John      |"))
                .and(predicate::str::contains("Jane").not()),
        );

    cabinet(dir)
        .args(["delete", "where", "lastname='Doe'"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records #1, #2 are deleted."));

    cabinet(dir)
        .arg("stat")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 record(s), 2 deleted."));

    cabinet(dir)
        .args(["delete", "lastname='Roe'"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid query format"));
}

#[test]
fn memory_storage_does_not_touch_data_file() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    cabinet(dir)
        .args(["--storage", "memory", "create", "--first-name", "Jane"])
        .args(["--last-name", "Doe", "--date-of-birth", "1990-05-01"])
        .args(["--age", "33", "--salary", "50000.00", "--gender", "F"])
        .assert()
        .success();

    assert!(!dir.join("cabinet.db").exists());
}

#[test]
fn logger_writes_audit_file() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    cabinet(dir).args(["--use-logger", "stat"]).assert().success();

    let log = std::fs::read_to_string(dir.join("cabinet.log")).unwrap();
    assert!(log.contains("Calling get_stat()"));
}

#[test]
fn shell_runs_commands_until_exit() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    cabinet(dir)
        .write_stdin(
            "create --first-name \"Mary Ann\" --last-name Doe --date-of-birth 1990-05-01 \
             --age 33 --salary 100 --gender F\n\
             frobnicate\n\
             find firstname \"mary ann\"\n\
             exit\n\
             stat\n",
        )
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Record #1 is created.")
                .and(predicate::str::contains("There is no 'frobnicate' command."))
                .and(predicate::str::contains("Mary Ann"))
                .and(predicate::str::contains("record(s)").not()),
        );
}
