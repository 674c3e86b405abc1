//! Hierarchical error types for cluster bootstrap.
//!
//! Errors are categorized by recovery path:
//! - [`ConfigError`]: missing or invalid topology/credential (pre-run, user-fixable)
//! - [`TransportError`]: the remote target could not be reached or logged into
//! - [`RemoteExecutionError`]: the remote command ran and failed
//! - [`ExtractionError`]: the join command could not be found in init output
//!
//! Lower layers only ever return these; whether a failure is fatal or
//! advisory is decided by the orchestrator (see [`crate::bootstrap::FailurePolicy`]).

use crate::bootstrap::Stage;
use crate::util::output_preview;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used throughout the crate.
pub type KubestrapResult<T> = Result<T, KubestrapError>;

// ============================================================================
// Top-Level Error
// ============================================================================

/// Errors that can occur while bootstrapping a cluster.
///
/// ```ignore
/// match orchestrator.run().await {
///     Err(KubestrapError::Stage { stage, source }) => { /* fatal stage */ }
///     Err(KubestrapError::Config(_)) => { /* user should fix config */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Error)]
pub enum KubestrapError {
    /// Configuration or topology problem (user-fixable).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Target unreachable, credential rejected, or transport not launchable.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Remote command ran and returned non-zero.
    #[error(transparent)]
    RemoteExecution(#[from] RemoteExecutionError),

    /// Join command not found in control-plane init output.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Operation not valid in the current run state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A fatal failure, labeled with the stage that owned it.
    #[error("stage '{stage}' failed")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<KubestrapError>,
    },
}

// ============================================================================
// Config Errors
// ============================================================================

/// Errors related to configuration loading or topology validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file is not valid YAML for the expected schema.
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No login secret in either lookup location.
    #[error(
        "login secret not found; set the {env_var} environment variable \
         or `login_secret` in {config_path}"
    )]
    MissingSecret {
        env_var: &'static str,
        config_path: PathBuf,
    },

    /// Topology violates its invariants.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Environment playbook is missing.
    #[error("playbook not found: {0}")]
    PlaybookNotFound(PathBuf),

    /// Host inventory could not be written.
    #[error("cannot write inventory {path}: {source}")]
    InventoryWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Transport Errors
// ============================================================================

/// Errors reaching or authenticating against a remote target.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The local transport program could not be started.
    #[error("cannot launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Target could not be reached within the connection timeout.
    #[error("cannot connect to {target}: {preview}")]
    ConnectionFailed { target: String, preview: String },

    /// Target rejected the login credential.
    #[error("authentication rejected by {target}: {preview}")]
    AuthenticationFailed { target: String, preview: String },
}

// ============================================================================
// Remote Execution Errors
// ============================================================================

/// A remote command ran and returned non-zero.
///
/// The full captured output is kept so callers can still inspect it;
/// `Display` only shows a truncated preview.
#[derive(Debug, Error)]
#[error("command on {target} exited with {exit_code}: {}", output_preview(.output))]
pub struct RemoteExecutionError {
    pub target: String,
    pub exit_code: i32,
    pub output: String,
}

// ============================================================================
// Extraction Errors
// ============================================================================

/// Errors while extracting the join command.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No `kubeadm join ... sha256:<hash>` sequence in the output.
    #[error("join command not found in output: {preview}")]
    TokenNotFound { preview: String },
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl KubestrapError {
    /// Label a failure with the stage that owns it.
    pub fn in_stage(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Stage label, if this is a stage failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, with any stage labels peeled off.
    pub fn root(&self) -> &KubestrapError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl TransportError {
    pub fn launch(program: impl Into<String>, source: io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }

    pub fn connection_failed(target: impl Into<String>, output: &str) -> Self {
        Self::ConnectionFailed {
            target: target.into(),
            preview: output_preview(output),
        }
    }

    pub fn authentication_failed(target: impl Into<String>, output: &str) -> Self {
        Self::AuthenticationFailed {
            target: target.into(),
            preview: output_preview(output),
        }
    }
}

impl ExtractionError {
    pub fn token_not_found(output: &str) -> Self {
        Self::TokenNotFound {
            preview: output_preview(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_hierarchy() {
        let err: KubestrapError = ConfigError::InvalidTopology("empty".into()).into();
        assert!(matches!(err, KubestrapError::Config(_)));

        let err: KubestrapError = TransportError::connection_failed("10.0.0.1", "timeout").into();
        assert!(matches!(err, KubestrapError::Transport(_)));

        let err: KubestrapError = ExtractionError::token_not_found("nothing").into();
        assert!(matches!(err, KubestrapError::Extraction(_)));
    }

    #[test]
    fn test_stage_label_and_root() {
        let err: KubestrapError = ExtractionError::token_not_found("").into();
        let err = err.in_stage(Stage::TokenExtracted);

        assert_eq!(err.stage(), Some(Stage::TokenExtracted));
        assert!(matches!(err.root(), KubestrapError::Extraction(_)));
        assert!(err.to_string().starts_with("stage 'token-extracted' failed"));
    }

    #[test]
    fn test_remote_execution_display_is_truncated() {
        let err = RemoteExecutionError {
            target: "nodes".into(),
            exit_code: 2,
            output: "x".repeat(1000),
        };
        let message = err.to_string();

        assert!(message.starts_with("command on nodes exited with 2: "));
        assert!(message.len() < 300);
        assert_eq!(err.output.len(), 1000);
    }

    #[test]
    fn test_missing_secret_names_both_locations() {
        let err = ConfigError::MissingSecret {
            env_var: "KUBESTRAP_SSH_PASSWORD",
            config_path: PathBuf::from("config.yaml"),
        };
        let message = err.to_string();

        assert!(message.contains("KUBESTRAP_SSH_PASSWORD"));
        assert!(message.contains("login_secret"));
        assert!(message.contains("config.yaml"));
    }
}
