//! Terminal escape-sequence normalization.
//!
//! Subprocesses are told not to emit color (`TERM=dumb`, `NO_COLOR`), but
//! plenty of tools force escapes anyway, so everything read from a child is
//! additionally run through `strip_ansi` before it reaches the output buffer.

use std::sync::OnceLock;

use regex::Regex;

fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // CSI sequences, OSC sequences (BEL or ST terminated), then any
        // remaining two-byte escape.
        Regex::new(
            r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]",
        )
        .expect("ansi pattern is valid")
    })
}

/// Removes ANSI/VT100 escape sequences, leaving printable content intact.
pub fn strip_ansi(input: &str) -> String {
    ansi_pattern().replace_all(input, "").into_owned()
}
