//! Interactive-prompt detection over recent process output.
//!
//! The rule set is data-driven: an ordered list of exclusion patterns is
//! evaluated first and short-circuits detection, then inclusion patterns are
//! matched against the tail of the accumulated output. Hosts can supply
//! their own pattern lists without touching engine logic.

use regex::{Regex, RegexBuilder};

/// Number of trailing lines scanned on each detection pass.
const TAIL_LINES: usize = 8;

/// Markers that veto detection for the whole tail window: failure output
/// and in-flight progress indicators. Bare activity verbs ("Installing...")
/// deliberately do not appear here; package managers print those right
/// before a genuine confirmation prompt.
const DEFAULT_EXCLUSIONS: &[&str] = &[
    r"\berror\b",
    r"\bfailed\b",
    r"suggestion:",
    r"\d+\s*%",
    r"[✓✔✗✖]",
];

/// Cues that a subprocess is blocked waiting on human input.
const DEFAULT_INCLUSIONS: &[&str] = &[
    r"\[y/n\]",
    r"\[y/N\]",
    r"\(y/n\)",
    r"\(yes/no\)",
    r"\[yes/no\]",
    r"password\s*.*:\s*$",
    r"passphrase\s*.*:\s*$",
    r"press\s+(enter|return|any key)",
    r"use arrow keys",
    r"select an option",
    r"do you want[^?]*\?\s*$",
    r"are you sure[^?]*\?\s*$",
    r"would you like[^?]*\?\s*$",
    r"continue\?\s*$",
];

/// Ordered exclusion-then-inclusion prompt rule set.
pub struct PromptRules {
    exclusions: Vec<Regex>,
    inclusions: Vec<Regex>,
}

impl PromptRules {
    /// Builds a rule set from raw pattern lists. All patterns are compiled
    /// case-insensitively.
    pub fn new<S: AsRef<str>>(exclusions: &[S], inclusions: &[S]) -> Result<Self, regex::Error> {
        let compile = |patterns: &[S]| -> Result<Vec<Regex>, regex::Error> {
            patterns
                .iter()
                .map(|p| RegexBuilder::new(p.as_ref()).case_insensitive(true).build())
                .collect()
        };
        Ok(Self {
            exclusions: compile(exclusions)?,
            inclusions: compile(inclusions)?,
        })
    }

    /// Scans the tail of `output` for an interactive prompt.
    ///
    /// Returns the matched line when an inclusion pattern fires and no
    /// exclusion pattern matched anywhere in the scanned window.
    pub fn detect(&self, output: &str) -> Option<String> {
        let lines: Vec<&str> = output.lines().collect();
        let start = lines.len().saturating_sub(TAIL_LINES);
        let tail = &lines[start..];

        for line in tail {
            if self.exclusions.iter().any(|rule| rule.is_match(line)) {
                return None;
            }
        }

        for line in tail.iter().rev() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if self.inclusions.iter().any(|rule| rule.is_match(trimmed)) {
                return Some(trimmed.to_string());
            }
        }

        None
    }
}

impl Default for PromptRules {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS, DEFAULT_INCLUSIONS)
            .expect("default prompt patterns are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_yes_no_confirmation() {
        let rules = PromptRules::default();
        let prompt = rules.detect("Installing package\nContinue? [y/n]");
        assert_eq!(prompt.as_deref(), Some("Continue? [y/n]"));
    }

    #[test]
    fn detects_password_prompt() {
        let rules = PromptRules::default();
        assert!(rules.detect("Password:").is_some());
        assert!(rules.detect("Enter passphrase for key:").is_some());
    }

    #[test]
    fn detects_press_enter() {
        let rules = PromptRules::default();
        assert!(rules.detect("Press ENTER to continue").is_some());
        assert!(rules.detect("press any key when ready").is_some());
    }

    #[test]
    fn detects_list_selection_cue() {
        let rules = PromptRules::default();
        assert!(rules
            .detect("? Pick a template (Use arrow keys)\n> default\n  minimal")
            .is_some());
    }

    #[test]
    fn activity_lines_do_not_mask_a_later_prompt() {
        let rules = PromptRules::default();
        // The package-manager flow: announce work, then ask.
        assert!(rules
            .detect("Installing dependencies\nresolving packages\nContinue? [y/n]")
            .is_some());
        assert!(rules
            .detect("Downloading metadata\nProceed with install? (y/n)")
            .is_some());
        assert!(rules.detect("Building wheel for package\nContinue? [y/n]").is_some());
    }

    #[test]
    fn exclusion_short_circuits_inclusion() {
        let rules = PromptRules::default();
        // A failed build that happens to mention a y/n flag must not count.
        assert!(rules.detect("error: bad flag\nretry? [y/n]").is_none());
        assert!(rules.detect("build failed\nContinue? [y/n]").is_none());
    }

    #[test]
    fn progress_markers_are_excluded() {
        let rules = PromptRules::default();
        assert!(rules.detect("Downloading 42%\nContinue? [y/n]").is_none());
        assert!(rules.detect("✓ done\nwould you like to proceed?").is_none());
    }

    #[test]
    fn plain_output_is_not_a_prompt() {
        let rules = PromptRules::default();
        assert!(rules.detect("hello\nworld").is_none());
        assert!(rules.detect("").is_none());
    }

    #[test]
    fn only_the_tail_window_is_scanned() {
        let rules = PromptRules::default();
        // An old prompt followed by many lines of ordinary output is stale.
        let mut output = String::from("Continue? [y/n]\n");
        for i in 0..20 {
            output.push_str(&format!("line {i}\n"));
        }
        assert!(rules.detect(&output).is_none());
    }

    #[test]
    fn custom_rule_set_is_honored() {
        let rules = PromptRules::new(&["skipme"], &["^confirm:"]).unwrap();
        assert_eq!(rules.detect("confirm: ok?").as_deref(), Some("confirm: ok?"));
        assert!(rules.detect("skipme\nconfirm: ok?").is_none());
    }
}
