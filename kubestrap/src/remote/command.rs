//! Structured remote shell commands.
//!
//! Remote commands end up as one string handed to the remote shell, so
//! every word is quoted at render time instead of being spliced into a
//! `format!` template. Only words added with [`ShellCommand::raw`] are
//! emitted verbatim; use it for fixed shell expansions like `$HOME`.

use std::borrow::Cow;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Word {
    Quoted(String),
    Raw(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    env: Vec<(String, String)>,
    words: Vec<Word>,
}

/// A shell command line: one or more steps joined with `&&`.
///
/// # Examples
///
/// ```
/// use kubestrap::remote::ShellCommand;
///
/// let cmd = ShellCommand::new("mkdir")
///     .arg("-p")
///     .raw("$HOME/.kube")
///     .then("kubectl")
///     .env("KUBECONFIG", "/etc/kubernetes/admin.conf")
///     .args(["get", "nodes"]);
///
/// assert_eq!(
///     cmd.render(),
///     "mkdir -p $HOME/.kube && KUBECONFIG=/etc/kubernetes/admin.conf kubectl get nodes"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellCommand {
    steps: Vec<Step>,
}

impl ShellCommand {
    /// Start a command with `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            steps: vec![Step {
                env: Vec::new(),
                words: vec![Word::Quoted(program.into())],
            }],
        }
    }

    /// Add a single argument to the current step.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.current().words.push(Word::Quoted(arg.into()));
        self
    }

    /// Add multiple arguments to the current step.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current()
            .words
            .extend(args.into_iter().map(|a| Word::Quoted(a.into())));
        self
    }

    /// Add `--name=value` as one argument.
    pub fn flag(self, name: &str, value: impl AsRef<str>) -> Self {
        self.arg(format!("{}={}", name, value.as_ref()))
    }

    /// Add a word that the remote shell should expand (not quoted).
    pub fn raw(mut self, word: impl Into<String>) -> Self {
        self.current().words.push(Word::Raw(word.into()));
        self
    }

    /// Set an environment variable for the current step.
    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.current().env.push((key.into(), val.into()));
        self
    }

    /// Start a new step that runs only if the previous one succeeded.
    pub fn then(mut self, program: impl Into<String>) -> Self {
        self.steps.push(Step {
            env: Vec::new(),
            words: vec![Word::Quoted(program.into())],
        });
        self
    }

    /// Render to a single line for the remote shell.
    pub fn render(&self) -> String {
        self.steps
            .iter()
            .map(|step| {
                let env = step
                    .env
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, quote(v)));
                let words = step.words.iter().map(|w| match w {
                    Word::Quoted(s) => quote(s).into_owned(),
                    Word::Raw(s) => s.clone(),
                });
                env.chain(words).collect::<Vec<_>>().join(" ")
            })
            .collect::<Vec<_>>()
            .join(" && ")
    }

    fn current(&mut self) -> &mut Step {
        // `new` always creates the first step
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Quote a word for a POSIX shell.
///
/// Words made only of safe characters are returned unchanged; everything
/// else is single-quoted, with embedded `'` written as `'"'"'`.
pub fn quote(word: &str) -> Cow<'_, str> {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c);

    if !word.is_empty() && word.chars().all(is_safe) {
        return Cow::Borrowed(word);
    }

    Cow::Owned(format!("'{}'", word.replace('\'', r#"'"'"'"#)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_safe_word_unchanged() {
        assert_eq!(quote("--cri-socket=unix:///run/containerd.sock"), "--cri-socket=unix:///run/containerd.sock");
        assert_eq!(quote("sha256:abc123"), "sha256:abc123");
    }

    #[test]
    fn test_quote_special_characters() {
        assert_eq!(quote(""), "''");
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("$(reboot)"), "'$(reboot)'");
        assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn test_render_steps_and_raw_words() {
        let cmd = ShellCommand::new("kubeadm")
            .args(["reset", "-f"])
            .then("rm")
            .arg("-rf")
            .arg("/etc/kubernetes/")
            .raw("$HOME/.kube");

        assert_eq!(
            cmd.render(),
            "kubeadm reset -f && rm -rf /etc/kubernetes/ $HOME/.kube"
        );
    }

    #[test]
    fn test_flag_values_are_quoted_as_one_word() {
        let cmd = ShellCommand::new("kubeadm").flag("--node-name", "node 1");
        assert_eq!(cmd.render(), "kubeadm '--node-name=node 1'");
    }

    #[test]
    fn test_env_applies_to_its_step_only() {
        let cmd = ShellCommand::new("true")
            .then("kubectl")
            .env("KUBECONFIG", "/etc/kubernetes/admin.conf")
            .arg("apply");

        assert_eq!(
            cmd.to_string(),
            "true && KUBECONFIG=/etc/kubernetes/admin.conf kubectl apply"
        );
    }
}
