use kubestrap_test_utils::fixtures;
use predicates::prelude::*;

mod common;

#[test]
fn test_join_command_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.log");
    std::fs::write(&path, fixtures::kubeadm_init_output("10.0.0.10")).unwrap();

    let mut cmd = common::bare_cmd();
    cmd.arg("join-command")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            fixtures::join_command("10.0.0.10")
        )));
}

#[test]
fn test_join_command_from_stdin() {
    let mut cmd = common::bare_cmd();
    cmd.arg("join-command")
        .write_stdin(fixtures::kubeadm_init_output("10.0.0.10"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kubeadm join 10.0.0.10:6443 --token"))
        .stdout(predicate::str::contains(fixtures::CA_HASH));
}

#[test]
fn test_join_command_not_found() {
    let mut cmd = common::bare_cmd();
    cmd.arg("join-command")
        .write_stdin("[init] Using Kubernetes version: v1.28.2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("join command not found"));
}

#[test]
fn test_join_command_missing_file() {
    let mut cmd = common::bare_cmd();
    cmd.args(["join-command", "/nonexistent/init.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read /nonexistent/init.log"));
}
