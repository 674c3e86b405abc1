//! Cluster topology: who is the control plane, who are the workers, how to log in.

use crate::error::{ConfigError, KubestrapResult};
use std::fmt;
use std::net::Ipv6Addr;

/// Characters that would change the meaning of an inventory line or host pattern.
const RESERVED_ADDRESS_CHARS: &[char] = &['=', '[', ']', '#', ',', ':', ';', '"', '\''];

/// Validated cluster topology.
///
/// Invariants (checked by [`ClusterTopology::new`]):
/// - control-plane address and credential are non-empty
/// - workers are non-empty, distinct, first-seen order preserved
/// - no worker shares the control-plane address
/// - addresses carry no whitespace, control characters or inventory
///   syntax (`=`, `[`, `]`, `#`, `,`, `:`, `;`, quotes); a literal IPv6
///   address is the one place `:` is accepted
///
/// Only [`ClusterTopology::remove_worker`] mutates it, and the orchestrator
/// only ever sees a shared reference, so a run can't change it.
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterTopology {
    control_plane: String,
    workers: Vec<String>,
    login_user: String,
    login_secret: String,
}

impl ClusterTopology {
    pub fn new<I, S>(
        control_plane: impl Into<String>,
        workers: I,
        login_user: impl Into<String>,
        login_secret: impl Into<String>,
    ) -> KubestrapResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut topology = Self {
            control_plane: control_plane.into().trim().to_string(),
            workers: Vec::new(),
            login_user: login_user.into(),
            login_secret: login_secret.into(),
        };

        for worker in workers {
            let worker = worker.into().trim().to_string();
            if !worker.is_empty() && topology.workers.contains(&worker) {
                tracing::debug!(worker = %worker, "Dropping duplicate worker address");
                continue;
            }
            topology.workers.push(worker);
        }

        topology.validate()?;
        Ok(topology)
    }

    /// Re-check the invariants listed on the type.
    pub fn validate(&self) -> KubestrapResult<()> {
        if self.control_plane.is_empty() {
            return Err(invalid("control-plane address is empty"));
        }
        check_address("control-plane address", &self.control_plane)?;
        if self.login_secret.is_empty() {
            return Err(invalid("login credential is empty"));
        }

        for (i, worker) in self.workers.iter().enumerate() {
            if worker.is_empty() {
                return Err(invalid(format!("worker address #{} is empty", i + 1)));
            }
            check_address("worker address", worker)?;
            if *worker == self.control_plane {
                return Err(invalid(format!(
                    "worker {} is also the control-plane address",
                    worker
                )));
            }
            if self.workers[..i].contains(worker) {
                return Err(invalid(format!("worker {} is listed twice", worker)));
            }
        }

        Ok(())
    }

    pub fn control_plane(&self) -> &str {
        &self.control_plane
    }

    pub fn workers(&self) -> &[String] {
        &self.workers
    }

    pub fn login_user(&self) -> &str {
        &self.login_user
    }

    pub fn login_secret(&self) -> &str {
        &self.login_secret
    }

    /// Single-node cluster (control plane only).
    pub fn is_single_node(&self) -> bool {
        self.workers.is_empty()
    }

    /// Drop a worker before a run. Returns whether it was present.
    pub fn remove_worker(&mut self, address: &str) -> bool {
        let before = self.workers.len();
        self.workers.retain(|w| w != address.trim());
        before != self.workers.len()
    }
}

impl fmt::Debug for ClusterTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterTopology")
            .field("control_plane", &self.control_plane)
            .field("workers", &self.workers)
            .field("login_user", &self.login_user)
            .finish_non_exhaustive()
    }
}

fn check_address(role: &str, address: &str) -> KubestrapResult<()> {
    if address.parse::<Ipv6Addr>().is_ok() {
        return Ok(());
    }
    let bad = address
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || RESERVED_ADDRESS_CHARS.contains(c));
    match bad {
        Some(c) => Err(invalid(format!(
            "{} {:?} contains forbidden character {:?}",
            role, address, c
        ))),
        None => Ok(()),
    }
}

fn invalid(reason: impl Into<String>) -> crate::error::KubestrapError {
    ConfigError::InvalidTopology(reason.into()).into()
}
