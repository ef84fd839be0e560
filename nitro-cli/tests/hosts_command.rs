use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BASE: &str = "127.0.0.1\tlocalhost\n::1\tlocalhost\n";

fn nitro() -> Command {
    Command::cargo_bin("nitro").expect("nitro binary")
}

fn hosts_file(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hosts");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn writes_managed_block() {
    let (_dir, path) = hosts_file(BASE);

    nitro()
        .args(["hosts", "--hostnames", "a.nitro,b.nitro", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        format!("{BASE}\n# <nitro>\n127.0.0.1\ta.nitro b.nitro\n# </nitro>\n")
    );
}

#[test]
fn second_run_is_a_no_op() {
    let (_dir, path) = hosts_file(BASE);
    for _ in 0..2 {
        nitro()
            .args(["hosts", "--hostnames=a.nitro", "--path"])
            .arg(&path)
            .assert()
            .success();
    }
    let after_two = std::fs::read_to_string(&path).unwrap();

    nitro()
        .args(["hosts", "--hostnames=a.nitro", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_two);
}

#[test]
fn dry_run_prints_diff_and_leaves_file() {
    let (_dir, path) = hosts_file(BASE);

    nitro()
        .args(["hosts", "--hostnames", "a.nitro", "--dry-run", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("+127.0.0.1\ta.nitro"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), BASE);
}

#[test]
fn custom_address_is_used() {
    let (_dir, path) = hosts_file(BASE);

    nitro()
        .args(["hosts", "--hostnames", "a.nitro", "--address", "192.168.1.5", "--path"])
        .arg(&path)
        .assert()
        .success();

    assert!(std::fs::read_to_string(&path)
        .unwrap()
        .contains("192.168.1.5\ta.nitro\n"));
}

#[test]
fn missing_hosts_file_fails() {
    let dir = TempDir::new().unwrap();

    nitro()
        .args(["hosts", "--hostnames", "a.nitro", "--path"])
        .arg(dir.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn hostnames_are_required() {
    nitro()
        .arg("hosts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--hostnames"));
}

#[test]
fn apply_without_config_points_at_init() {
    let home = TempDir::new().unwrap();

    nitro()
        .env("HOME", home.path())
        .env("USERPROFILE", home.path())
        .arg("apply")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nitro init"));
}
