use kubestrap_test_utils::fixtures::ConfigDir;
use predicates::prelude::*;

mod common;

#[test]
fn test_bootstrap_missing_playbook_fails_preparing() {
    let mut ctx = common::kubestrap();
    std::fs::remove_file(&ctx.dir.playbook_path).unwrap();

    ctx.cmd
        .arg("bootstrap")
        .assert()
        .failure()
        .stdout(predicate::str::contains("[1/5]"))
        .stdout(predicate::str::contains("preparing"))
        .stdout(predicate::str::contains("fatal"))
        .stderr(predicate::str::contains("stage 'preparing' failed"))
        .stderr(predicate::str::contains("playbook not found"));

    // Inventory is written before the playbook check
    assert!(ctx.dir.inventory_path.exists());
}

#[test]
fn test_bootstrap_rejects_worker_equal_to_control_plane() {
    let dir = ConfigDir::new(common::CONTROL_PLANE, &[common::CONTROL_PLANE]);
    let mut ctx = common::with_dir(dir);

    ctx.cmd
        .arg("bootstrap")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid topology"));
    assert!(!ctx.dir.inventory_path.exists());
}

#[test]
fn test_bootstrap_unknown_config_field() {
    let ctx = common::kubestrap();
    let mut text = std::fs::read_to_string(&ctx.dir.config_path).unwrap();
    text.push_str("worker_count: 3\n");
    std::fs::write(&ctx.dir.config_path, text).unwrap();

    ctx.new_cmd()
        .arg("bootstrap")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse"));
}

#[test]
fn test_bootstrap_writes_log_file() {
    let mut ctx = common::kubestrap();
    std::fs::remove_file(&ctx.dir.playbook_path).unwrap();
    let log_dir = ctx.dir.path().join("logs");

    ctx.cmd
        .arg("--log-dir")
        .arg(&log_dir)
        .arg("bootstrap")
        .assert()
        .failure();

    let log = std::fs::read_to_string(log_dir.join("kubestrap.log")).unwrap();
    assert!(log.contains("preparing"));
}
