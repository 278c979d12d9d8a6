//! # Bridge Firewall - Command Safety Filter
//!
//! The safety filter sits between an authenticated caller and any tool that
//! touches the host shell or filesystem. It screens the command line and its
//! arguments against two fixed deny-lists before a handler is allowed to run.
//!
//! ## Rule Sets
//!
//! | List | Predicate | Blocks |
//! |------|-----------|--------|
//! | Blocked paths | [`path_is_blocked`] | Credential files, SSH/GPG/cloud config, private keys, system password files, keychains |
//! | Dangerous patterns | [`command_is_dangerous`] | Recursive delete, privilege elevation, `chmod 777`, disk formatting, raw device writes, pipe-to-shell, command substitution, chained destructive commands |
//!
//! Both lists are ordered and evaluated short-circuit on the first match.
//!
//! ## Limitations
//!
//! This is a deny-list. It cannot enumerate every injection vector and must
//! not be treated as a sandbox: quoting tricks, environment expansion, aliases
//! and interpreter flags (`python -c`, `perl -e`) all pass through. It raises
//! the cost of casual misuse by a caller that already holds the bridge token.
//! Operators who need isolation must provide it at the OS level.
//!
//! ## Usage
//!
//! ```rust
//! use bridge_firewall::{SafetyFilter, ScanResult};
//!
//! let filter = SafetyFilter::new();
//!
//! assert!(filter.screen_command("git", &["status".to_string()]).is_safe());
//!
//! match filter.screen_command("cat", &["~/.ssh/id_rsa".to_string()]) {
//!     ScanResult::Safe => unreachable!(),
//!     ScanResult::Blocked { category, detail } => {
//!         println!("blocked ({category}): {detail}");
//!     }
//! }
//! ```

pub mod filter;
pub mod models;
pub mod redact;
mod rules;

pub use filter::{command_is_dangerous, path_is_blocked, SafetyFilter};
pub use models::{RuleCategory, ScanResult};
pub use redact::{redact_args, REDACTED, TRUNCATE_AT};
