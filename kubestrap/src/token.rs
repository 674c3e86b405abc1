//! Join-command extraction from `kubeadm init` output.
//!
//! The transport may hand back the join command wrapped across lines,
//! with `\` continuation markers, or with newlines escaped as literal
//! `\n` inside JSON-ish output. Extraction is a pure function of the
//! input text.

use crate::error::{ExtractionError, KubestrapResult};
use crate::util::strip_ansi_codes;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const JOIN_DIRECTIVE: &str = "kubeadm join";
const CA_HASH_FLAG: &str = "--discovery-token-ca-cert-hash";
const TOKEN_FLAG: &str = "--token";

/// From the join directive up to the first complete `sha256:` digest.
static JOIN_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"kubeadm\s+join\s[\s\S]*?--discovery-token-ca-cert-hash\s+sha256:[0-9a-fA-F]{64}\b")
        .expect("join command pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalized worker join command.
///
/// Always a single line, single-spaced, starting with `kubeadm join` and
/// ending with the CA certificate hash. Valid until the control plane's
/// token TTL expires; that expiry is not tracked here.
#[derive(Clone, PartialEq, Eq)]
pub struct EnrollmentToken {
    command: String,
}

impl EnrollmentToken {
    /// The full command line.
    pub fn as_str(&self) -> &str {
        &self.command
    }

    /// Whitespace-separated words of the command.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.command.split(' ')
    }

    /// API server endpoint, e.g. `10.0.0.1:6443`.
    pub fn endpoint(&self) -> Option<&str> {
        self.words().nth(2).filter(|w| !w.starts_with("--"))
    }

    /// Bootstrap token value passed with `--token`.
    pub fn bootstrap_token(&self) -> Option<&str> {
        self.flag_value(TOKEN_FLAG)
    }

    /// CA certificate hash, e.g. `sha256:abc...`.
    pub fn ca_cert_hash(&self) -> Option<&str> {
        self.flag_value(CA_HASH_FLAG)
    }

    fn flag_value(&self, flag: &str) -> Option<&str> {
        let mut words = self.words();
        words.find(|w| *w == flag)?;
        words.next()
    }
}

impl fmt::Display for EnrollmentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

impl fmt::Debug for EnrollmentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnrollmentToken")
            .field("endpoint", &self.endpoint())
            .field("ca_cert_hash", &self.ca_cert_hash())
            .finish_non_exhaustive()
    }
}

/// Locate and normalize the join command in raw init output.
///
/// When the output holds several join commands the first one wins.
/// Fails with `TokenNotFound` if no directive is followed by a complete hash.
pub fn extract(raw_output: &str) -> KubestrapResult<EnrollmentToken> {
    let cleaned = normalize(raw_output);

    let found = JOIN_COMMAND
        .find(&cleaned)
        .ok_or_else(|| ExtractionError::token_not_found(raw_output))?
        .as_str();

    let collapsed = WHITESPACE.replace_all(found, " ");

    // The lazy match can still span an earlier directive that never got a
    // hash; keep only the part starting at the last directive before it.
    let start = collapsed.rfind(JOIN_DIRECTIVE).unwrap_or(0);
    let command = collapsed[start..].trim().to_string();

    Ok(EnrollmentToken { command })
}

/// Turn escapes and continuation markers into plain spaces.
fn normalize(raw: &str) -> String {
    strip_ansi_codes(raw)
        .replace("\\r\\n", " ")
        .replace("\\n", " ")
        .replace("\\r", " ")
        .replace("\\t", " ")
        .replace('\\', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KubestrapError;

    const HASH: &str = "1b2c3d4e5f60718293a4b5c6d7e8f90112233445566778899aabbccddeeff001";
    const OTHER_HASH: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

    fn join(host: &str, hash: &str) -> String {
        format!(
            "kubeadm join {host}:6443 --token abcdef.0123456789abcdef \\\n\t--discovery-token-ca-cert-hash sha256:{hash}"
        )
    }

    #[test]
    fn test_extract_from_plain_output() {
        let output = format!(
            "[addons] Applied essential addon: kube-proxy\n\n\
             Then you can join any number of worker nodes by running the following on each as root:\n\n\
             {}\n",
            join("10.0.0.1", HASH)
        );

        let token = extract(&output).unwrap();
        assert_eq!(
            token.as_str(),
            format!(
                "kubeadm join 10.0.0.1:6443 --token abcdef.0123456789abcdef \
                 --discovery-token-ca-cert-hash sha256:{HASH}"
            )
        );
        assert_eq!(token.endpoint(), Some("10.0.0.1:6443"));
        assert_eq!(token.bootstrap_token(), Some("abcdef.0123456789abcdef"));
        assert_eq!(token.ca_cert_hash(), Some(format!("sha256:{HASH}").as_str()));
    }

    #[test]
    fn test_extract_from_escaped_output() {
        let output = format!(
            "master | CHANGED | rc=0 >>\n{{\"stdout\": \"kubeadm join 10.0.0.1:6443   --token abc.def \\\\\\n\\t   --discovery-token-ca-cert-hash sha256:{HASH}\\n\"}}"
        );

        let token = extract(&output).unwrap();
        assert!(!token.as_str().contains('\n'));
        assert!(!token.as_str().contains("  "));
        assert_eq!(token.as_str().matches(JOIN_DIRECTIVE).count(), 1);
        assert!(token.as_str().ends_with(HASH));
    }

    #[test]
    fn test_first_candidate_wins() {
        let output = format!("{}\n{}\n", join("10.0.0.1", HASH), join("10.0.0.9", OTHER_HASH));
        let token = extract(&output).unwrap();
        assert_eq!(token.endpoint(), Some("10.0.0.1:6443"));
    }

    #[test]
    fn test_smallest_span_skips_dangling_directive() {
        let output = format!(
            "hint: run kubeadm join later\n{}",
            join("10.0.0.1", HASH)
        );
        let token = extract(&output).unwrap();
        assert!(token.as_str().starts_with("kubeadm join 10.0.0.1:6443"));
    }

    #[test]
    fn test_trailing_output_excluded() {
        let output = format!("{} --control-plane\nmore logs", join("10.0.0.1", HASH));
        let token = extract(&output).unwrap();
        assert!(token.as_str().ends_with(HASH));
    }

    #[test]
    fn test_short_hash_is_not_a_match() {
        let output = "kubeadm join 10.0.0.1:6443 --token a.b --discovery-token-ca-cert-hash sha256:abc123";
        assert!(extract(output).is_err());
    }

    #[test]
    fn test_not_found() {
        let err = extract("[init] Using Kubernetes version: v1.28.2").unwrap_err();
        assert!(matches!(
            err,
            KubestrapError::Extraction(ExtractionError::TokenNotFound { .. })
        ));
    }

    #[test]
    fn test_extract_is_pure() {
        let output = join("10.0.0.1", HASH);
        assert_eq!(extract(&output).unwrap(), extract(&output).unwrap());
    }

    #[test]
    fn test_colored_output() {
        let output = format!("\x1b[0;33m{}\x1b[0m", join("10.0.0.1", HASH));
        assert!(extract(&output).unwrap().as_str().ends_with(HASH));
    }
}
