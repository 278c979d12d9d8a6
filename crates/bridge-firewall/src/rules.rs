//! The fixed deny-lists.
//!
//! Order matters only for which rule gets reported; any match blocks.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::RuleCategory;

/// A compiled deny-list entry.
pub(crate) struct Rule {
    pub(crate) pattern: Regex,
    pub(crate) category: RuleCategory,
    pub(crate) description: &'static str,
}

impl Rule {
    fn new(pattern: &str, category: RuleCategory, description: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("deny-list pattern must compile"),
            category,
            description,
        }
    }

    fn path(pattern: &str, description: &'static str) -> Self {
        Self::new(pattern, RuleCategory::BlockedPath, description)
    }

    fn danger(pattern: &str, description: &'static str) -> Self {
        Self::new(pattern, RuleCategory::DangerousPattern, description)
    }
}

/// Sensitive files and directories, matched against the joined argument list.
pub(crate) static BLOCKED_PATHS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // Environment and secrets files
        Rule::path(r"(?i)\.env", "environment file"),
        Rule::path(r"(?i)\.dev\.vars", "environment file"),
        // Credential and config directories
        Rule::path(r"\.ssh", "SSH directory"),
        Rule::path(r"\.aws", "AWS credentials"),
        Rule::path(r"\.config/gcloud", "gcloud credentials"),
        Rule::path(r"\.kube/config", "kubeconfig"),
        Rule::path(r"\.docker/config\.json", "docker credentials"),
        Rule::path(r"\.gnupg", "GPG keyring"),
        Rule::path(r"\.gitconfig", "git config"),
        Rule::path(r"\.npmrc", "npm credentials"),
        Rule::path(r"\.netrc", "netrc credentials"),
        // Private keys
        Rule::path(r"id_rsa", "SSH private key"),
        Rule::path(r"id_ed25519", "SSH private key"),
        Rule::path(r"\.pem$", "PEM key file"),
        Rule::path(r"\.key$", "key file"),
        // Anything that names itself a secret
        Rule::path(r"(?i)password", "password file"),
        Rule::path(r"(?i)secret", "secret file"),
        Rule::path(r"(?i)token", "token file"),
        Rule::path(r"(?i)credential", "credential file"),
        // System files
        Rule::path(r"/etc/passwd", "system password file"),
        Rule::path(r"/etc/shadow", "system shadow file"),
        Rule::path(r"(?i)keychain", "keychain"),
    ]
});

/// Shell hazards, matched against the raw command line.
pub(crate) static DANGEROUS_PATTERNS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::danger(
            r"\brm\s+(-[a-zA-Z]*[rRf][a-zA-Z]*|--recursive|--force)",
            "recursive or forced delete",
        ),
        Rule::danger(r"\brm\s+.*[/*]", "delete by path or glob"),
        Rule::danger(r"\bsudo\b", "privilege elevation"),
        Rule::danger(r"\bsu(\s|$)", "privilege elevation"),
        Rule::danger(r"\bchmod\s+(-R\s+)?777", "world-writable permissions"),
        Rule::danger(r"\bmkfs", "filesystem format"),
        Rule::danger(r"\bdd\s+", "raw disk copy"),
        Rule::danger(r">\s*/dev/", "raw device write"),
        Rule::danger(r"/etc/passwd", "system password file"),
        Rule::danger(r"/etc/shadow", "system shadow file"),
        Rule::danger(r"\|\s*(ba|z|k|da)?sh\b", "pipe into shell"),
        Rule::danger(r"`[^`]*`", "backtick substitution"),
        Rule::danger(r"\$\(.*\)", "command substitution"),
        Rule::danger(r"&&\s*(rm|sudo|su|chmod|chown)\b", "chained dangerous command"),
        Rule::danger(r"\|\|\s*(rm|sudo|su|chmod|chown)\b", "chained dangerous command"),
        Rule::danger(r";\s*(rm|sudo|su|chmod|chown)\b", "chained dangerous command"),
    ]
});

/// First rule in `rules` matching `haystack`.
pub(crate) fn first_match<'a>(rules: &'a [Rule], haystack: &str) -> Option<&'a Rule> {
    rules.iter().find(|rule| rule.pattern.is_match(haystack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert!(!BLOCKED_PATHS.is_empty());
        assert!(!DANGEROUS_PATTERNS.is_empty());
    }

    #[test]
    fn test_categories_are_consistent() {
        assert!(BLOCKED_PATHS
            .iter()
            .all(|r| r.category == RuleCategory::BlockedPath));
        assert!(DANGEROUS_PATTERNS
            .iter()
            .all(|r| r.category == RuleCategory::DangerousPattern));
    }

    #[test]
    fn test_first_match_reports_earliest_rule() {
        let rule = first_match(&DANGEROUS_PATTERNS, "rm -rf /").unwrap();
        assert_eq!(rule.description, "recursive or forced delete");
    }
}
