//! Exit classification for ansible runs.
//!
//! ansible prints `UNREACHABLE!` next to a host it could not reach and
//! exits 4. Exit 4 alone is not enough: parser errors in a playbook or
//! inventory exit 4 too. Login failures are reported as unreachable, so
//! the message text decides between a connection and an authentication
//! failure.

use super::CommandOutput;
use crate::error::{KubestrapResult, RemoteExecutionError, TransportError};

const UNREACHABLE_MARKER: &str = "UNREACHABLE!";

const AUTH_MARKERS: &[&str] = &[
    "Invalid/incorrect password",
    "Authentication failed",
    "Permission denied",
    "incorrect password",
];

/// Map an exit code plus captured output to a result.
///
/// - `0` → `Ok`
/// - `UNREACHABLE!` with a login message → `AuthenticationFailed`
/// - `UNREACHABLE!` otherwise → `ConnectionFailed`
/// - any other non-zero → `RemoteExecutionError`, carrying the full output
pub fn classify(target: &str, exit_code: i32, output: String) -> KubestrapResult<CommandOutput> {
    if exit_code == 0 {
        return Ok(CommandOutput { output, exit_code });
    }

    if output.contains(UNREACHABLE_MARKER) {
        if AUTH_MARKERS.iter().any(|m| output.contains(m)) {
            return Err(TransportError::authentication_failed(target, &output).into());
        }
        return Err(TransportError::connection_failed(target, &output).into());
    }

    Err(RemoteExecutionError {
        target: target.to_string(),
        exit_code,
        output,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KubestrapError;

    #[test]
    fn test_success() {
        let out = classify("master", 0, "ok".into()).unwrap();
        assert_eq!(out.output, "ok");
    }

    #[test]
    fn test_unreachable_is_connection_failure() {
        let output = "10.0.0.2 | UNREACHABLE! => {\"msg\": \"Connection timed out during banner exchange\"}";
        let err = classify("10.0.0.2", 4, output.into()).unwrap_err();
        assert!(matches!(
            err,
            KubestrapError::Transport(TransportError::ConnectionFailed { .. })
        ));
    }

    #[test]
    fn test_rejected_password_is_authentication_failure() {
        let output = "10.0.0.2 | UNREACHABLE! => {\"msg\": \"Invalid/incorrect password: Permission denied, please try again.\"}";
        let err = classify("10.0.0.2", 4, output.into()).unwrap_err();
        assert!(matches!(
            err,
            KubestrapError::Transport(TransportError::AuthenticationFailed { .. })
        ));
    }

    #[test]
    fn test_parser_error_exit_is_remote_execution_failure() {
        let output = "ERROR! We were unable to read either as JSON nor YAML";
        let err = classify("all", 4, output.into()).unwrap_err();
        match err {
            KubestrapError::RemoteExecution(e) => {
                assert_eq!(e.exit_code, 4);
                assert_eq!(e.output, output);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_command_keeps_output() {
        let output = "master | FAILED | rc=1 >>\nerror execution phase preflight";
        let err = classify("master", 2, output.into()).unwrap_err();
        match err {
            KubestrapError::RemoteExecution(e) => {
                assert_eq!(e.exit_code, 2);
                assert_eq!(e.output, output);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
