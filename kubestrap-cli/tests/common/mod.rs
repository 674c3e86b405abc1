#![allow(dead_code)]

use assert_cmd::Command;
use kubestrap_test_utils::fixtures::ConfigDir;
use std::time::Duration;

pub const CONTROL_PLANE: &str = "10.0.0.10";
pub const WORKERS: &[&str] = &["10.0.0.11", "10.0.0.12"];

/// A config directory plus a command preconfigured to use it.
pub struct TestContext {
    pub cmd: Command,
    pub dir: ConfigDir,
}

impl TestContext {
    /// A fresh command against the same config.
    pub fn new_cmd(&self) -> Command {
        let mut cmd = bare_cmd();
        cmd.arg("--config").arg(&self.dir.config_path);
        cmd
    }
}

/// Command with no config and a clean credential environment.
pub fn bare_cmd() -> Command {
    let bin_path = env!("CARGO_BIN_EXE_kubestrap");
    let mut cmd = Command::new(bin_path);
    // You can override this with .timeout(Duration::from_secs(N))
    cmd.timeout(Duration::from_secs(30));
    cmd.env_remove("KUBESTRAP_SSH_PASSWORD");
    cmd.env_remove("KUBESTRAP_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

pub fn kubestrap() -> TestContext {
    with_dir(ConfigDir::new(CONTROL_PLANE, WORKERS))
}

pub fn with_dir(dir: ConfigDir) -> TestContext {
    let mut cmd = bare_cmd();
    cmd.arg("--config").arg(&dir.config_path);
    TestContext { cmd, dir }
}
