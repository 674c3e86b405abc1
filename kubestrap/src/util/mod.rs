use crate::constants::OUTPUT_PREVIEW_CHARS;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Route logs to `file` (plain text, with module targets) and to stderr.
///
/// Both outputs share `filter`. Installing twice is a no-op.
pub fn register_to_tracing(file: NonBlocking, filter: EnvFilter) {
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(file);
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed");
    }
}

/// First [`OUTPUT_PREVIEW_CHARS`] characters of captured output, for error messages.
///
/// Cuts on a char boundary and marks the cut with `...`.
pub fn output_preview(output: &str) -> String {
    let trimmed = output.trim();
    match trimmed.char_indices().nth(OUTPUT_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Remove terminal control sequences from remote output.
///
/// Handles CSI (`ESC [` ... final byte, e.g. colors and `ESC [K`), OSC
/// (`ESC ]` ... BEL or `ESC \`) and two-byte escapes. ansible still emits
/// some of these with colors disabled.
pub fn strip_ansi_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('[') => {
                // parameter and intermediate bytes run until a final byte in @..=~
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_preview_short_is_unchanged() {
        assert_eq!(output_preview("  hello \n"), "hello");
    }

    #[test]
    fn test_output_preview_truncates_on_char_boundary() {
        let text = "é".repeat(OUTPUT_PREVIEW_CHARS + 10);
        let preview = output_preview(&text);

        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), OUTPUT_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_strip_ansi_codes() {
        assert_eq!(strip_ansi_codes("\x1b[0;32mok\x1b[0m: [k8s]"), "ok: [k8s]");
        assert_eq!(strip_ansi_codes("plain [not an escape]"), "plain [not an escape]");
    }

    #[test]
    fn test_strip_non_color_sequences() {
        assert_eq!(strip_ansi_codes("\x1b[Kchanged: [10.0.0.2]"), "changed: [10.0.0.2]");
        assert_eq!(strip_ansi_codes("a\x1b[2Jb\x1b[?25lc"), "abc");
        assert_eq!(strip_ansi_codes("\x1b]0;title\x07ok"), "ok");
        assert_eq!(strip_ansi_codes("\x1b]0;title\x1b\\ok"), "ok");
        assert_eq!(strip_ansi_codes("\x1b=keypad"), "keypad");
    }
}
