//! Safety filter facade.
//!
//! Two stateless predicates do the actual work:
//!
//! - [`path_is_blocked`] joins the arguments with spaces and tests the
//!   blocked-path list.
//! - [`command_is_dangerous`] tests the raw command line against the
//!   dangerous-pattern list.
//!
//! An argument-bearing command must pass both. [`SafetyFilter`] wraps them
//! into [`ScanResult`]s that name the rule that fired.

use crate::models::ScanResult;
use crate::rules::{first_match, Rule, BLOCKED_PATHS, DANGEROUS_PATTERNS};

/// `true` if any argument references a sensitive path.
pub fn path_is_blocked<S: AsRef<str>>(args: &[S]) -> bool {
    first_match(&BLOCKED_PATHS, &join(args)).is_some()
}

/// `true` if the command line contains a shell hazard.
pub fn command_is_dangerous(command: &str) -> bool {
    first_match(&DANGEROUS_PATTERNS, command).is_some()
}

fn join<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| a.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
}

fn verdict(rule: Option<&Rule>) -> ScanResult {
    match rule {
        None => ScanResult::Safe,
        Some(rule) => ScanResult::Blocked {
            category: rule.category,
            detail: rule.description.to_string(),
        },
    }
}

/// Screening entry point used by the tool dispatcher.
///
/// Holds no state; the rule lists are compiled once per process on first
/// use and shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyFilter;

impl SafetyFilter {
    /// Create a filter.
    pub fn new() -> Self {
        Self
    }

    /// Screen an argument list against the blocked-path rules.
    pub fn screen_paths<S: AsRef<str>>(&self, args: &[S]) -> ScanResult {
        verdict(first_match(&BLOCKED_PATHS, &join(args)))
    }

    /// Screen a raw command line against the dangerous-pattern rules.
    pub fn screen_command_line(&self, command: &str) -> ScanResult {
        verdict(first_match(&DANGEROUS_PATTERNS, command))
    }

    /// Screen a program and its arguments with both rule lists.
    ///
    /// The dangerous-pattern check runs over `program args...` as one line;
    /// the blocked-path check runs over the same tokens.
    pub fn screen_command<S: AsRef<str>>(&self, program: &str, args: &[S]) -> ScanResult {
        let mut tokens: Vec<&str> = Vec::with_capacity(args.len() + 1);
        tokens.push(program);
        tokens.extend(args.iter().map(|a| a.as_ref()));
        let line = tokens.join(" ");

        let danger = self.screen_command_line(&line);
        if danger.is_blocked() {
            return danger;
        }
        self.screen_paths(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleCategory;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_safe_command_passes_both_checks() {
        let filter = SafetyFilter::new();
        assert!(filter.screen_command("git", &args(&["status"])).is_safe());
        assert!(filter.screen_command("ls", &args(&["-la", "src"])).is_safe());
    }

    #[test]
    fn test_dangerous_reported_before_path() {
        let filter = SafetyFilter::new();
        let result = filter.screen_command("sudo", &args(&["cat", "/etc/shadow"]));
        assert_eq!(result.category(), Some(RuleCategory::DangerousPattern));
    }

    #[test]
    fn test_path_argument_blocked() {
        let filter = SafetyFilter::new();
        let result = filter.screen_command("cat", &args(&[".env"]));
        assert_eq!(result.category(), Some(RuleCategory::BlockedPath));
    }

    #[test]
    fn test_split_tokens_rejoined() {
        // Each token alone is harmless; the joined line is not.
        let filter = SafetyFilter::new();
        let result = filter.screen_command("ls", &args(&["|", "sh"]));
        assert!(result.is_blocked());
    }

    #[test]
    fn test_empty_args() {
        let empty: [&str; 0] = [];
        assert!(!path_is_blocked(&empty));
        assert!(!command_is_dangerous(""));
    }
}
