//! INI inventory rendering and persistence.
//!
//! Layout consumed by ansible:
//!
//! ```text
//! [master]
//! 10.0.0.1 ansible_user=root ansible_ssh_pass=secret
//!
//! [nodes]
//! 10.0.0.2 ansible_user=root ansible_ssh_pass=secret
//! ```

use super::{Host, HostGroups};
use crate::error::{ConfigError, KubestrapResult};
use crate::remote::quote;
use std::path::{Path, PathBuf};

/// Persists host groups where the remote runner can read them.
pub trait InventoryWriter: Send + Sync {
    /// Replace any previous inventory with `groups`.
    fn write(&self, groups: &HostGroups) -> KubestrapResult<()>;
}

/// Writes the INI inventory to a file, overwriting it on every run.
#[derive(Clone, Debug)]
pub struct FileInventoryWriter {
    path: PathBuf,
}

impl FileInventoryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InventoryWriter for FileInventoryWriter {
    fn write(&self, groups: &HostGroups) -> KubestrapResult<()> {
        std::fs::write(&self.path, render_ini(groups)).map_err(|source| {
            ConfigError::InventoryWrite {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::info!(path = %self.path.display(), "Wrote host inventory");
        Ok(())
    }
}

/// Render groups as INI text. Values with shell-significant characters are quoted.
pub fn render_ini(groups: &HostGroups) -> String {
    let mut out = String::new();

    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", group.name()));
        for host in group.members() {
            out.push_str(&host_line(host));
            out.push('\n');
        }
    }

    out
}

fn host_line(host: &Host) -> String {
    format!(
        "{} ansible_user={} ansible_ssh_pass={}",
        host.address,
        quote(&host.login_user),
        quote(&host.login_secret)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::build;
    use crate::topology::ClusterTopology;
    use tempfile::TempDir;

    fn groups(secret: &str, workers: &[&str]) -> HostGroups {
        let topology =
            ClusterTopology::new("10.0.0.1", workers.iter().copied(), "root", secret).unwrap();
        build(&topology).unwrap()
    }

    #[test]
    fn test_render_layout() {
        let text = render_ini(&groups("pw", &["10.0.0.2", "10.0.0.3"]));
        assert_eq!(
            text,
            "[master]\n\
             10.0.0.1 ansible_user=root ansible_ssh_pass=pw\n\
             \n\
             [nodes]\n\
             10.0.0.2 ansible_user=root ansible_ssh_pass=pw\n\
             10.0.0.3 ansible_user=root ansible_ssh_pass=pw\n"
        );
    }

    #[test]
    fn test_render_single_node_keeps_empty_nodes_group() {
        let text = render_ini(&groups("pw", &[]));
        assert!(text.ends_with("[nodes]\n"));
    }

    #[test]
    fn test_render_quotes_special_secret() {
        let text = render_ini(&groups("p w'#", &[]));
        assert!(text.contains(r#"ansible_ssh_pass='p w'"'"'#'"#));
    }

    #[test]
    fn test_file_writer_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts.ini");
        std::fs::write(&path, "stale content that is longer than the new inventory\n".repeat(20))
            .unwrap();

        let writer = FileInventoryWriter::new(&path);
        writer.write(&groups("pw", &["10.0.0.2"])).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("stale"));
        assert!(written.starts_with("[master]\n"));
    }

    #[test]
    fn test_file_writer_reports_path_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("hosts.ini");

        let err = FileInventoryWriter::new(&path)
            .write(&groups("pw", &[]))
            .unwrap_err();
        assert!(err.to_string().contains("hosts.ini"));
    }
}
