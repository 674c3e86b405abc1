//! Stage 2b: join-command extraction.

use crate::error::KubestrapResult;
use crate::token::{self, EnrollmentToken};

/// Extract the join command from the captured `kubeadm init` output.
pub fn run(init_output: &str) -> KubestrapResult<EnrollmentToken> {
    let token = token::extract(init_output)?;
    tracing::info!(endpoint = ?token.endpoint(), "Extracted worker join command");
    Ok(token)
}
