//! Core types for the safety filter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which deny-list a rule belongs to.
///
/// The two categories are reported separately so callers and operators can
/// tell "you asked for a secret" apart from "you asked to wreck the host".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Argument references a sensitive file or directory.
    BlockedPath,
    /// Command line contains a shell hazard.
    DangerousPattern,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockedPath => write!(f, "blocked path"),
            Self::DangerousPattern => write!(f, "dangerous pattern"),
        }
    }
}

/// Outcome of screening a command or argument list.
///
/// # Example
///
/// ```rust
/// use bridge_firewall::{RuleCategory, SafetyFilter};
///
/// let filter = SafetyFilter::new();
/// let result = filter.screen_paths(&[".env".to_string()]);
/// assert_eq!(result.category(), Some(RuleCategory::BlockedPath));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanResult {
    /// No rule matched.
    Safe,

    /// A rule matched; the call must not reach its handler.
    Blocked {
        /// List the matching rule came from.
        category: RuleCategory,
        /// Human-readable name of the matching rule.
        detail: String,
    },
}

impl ScanResult {
    /// `true` if no rule matched.
    #[inline]
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    /// `true` if a rule matched.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Category of the matching rule, if any.
    pub fn category(&self) -> Option<RuleCategory> {
        match self {
            Self::Safe => None,
            Self::Blocked { category, .. } => Some(*category),
        }
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Blocked { category, detail } => write!(f, "{category}: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_display() {
        let result = ScanResult::Blocked {
            category: RuleCategory::DangerousPattern,
            detail: "privilege elevation".to_string(),
        };
        assert_eq!(result.to_string(), "dangerous pattern: privilege elevation");
        assert!(result.is_blocked());
        assert!(!result.is_safe());
    }

    #[test]
    fn test_safe_has_no_category() {
        assert_eq!(ScanResult::Safe.category(), None);
    }
}
