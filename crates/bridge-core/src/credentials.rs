//! # Credential Store
//!
//! Resolves the single shared bearer token at startup.
//!
//! | Order | Source                                  |
//! |-------|-----------------------------------------|
//! | 1     | `BRIDGE_AUTH_TOKEN` environment variable |
//! | 2     | `authToken` in `bridge.config.json`     |
//!
//! Empty values count as absent. A config file that is missing stays quiet;
//! one that cannot be read or parsed logs a warning and is skipped. Only the
//! absence of a token from every source is fatal: there is no open mode.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

/// Environment variable consulted first.
pub const TOKEN_ENV: &str = "BRIDGE_AUTH_TOKEN";

/// Config file consulted second, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bridge.config.json";

/// The shared secret.
///
/// Has no `Display` or `Serialize`; `Debug` prints a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token, rejecting the empty string.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// The raw secret, for comparison only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Token length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; empty tokens are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

#[derive(Deserialize)]
struct FileCredentials {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
}

/// Resolve the token from an explicit override, then the config file.
pub fn resolve_token(env_override: Option<String>, config_path: &Path) -> Option<AuthToken> {
    if let Some(token) = env_override.and_then(AuthToken::new) {
        debug!(source = TOKEN_ENV, "auth token resolved");
        return Some(token);
    }
    let token = read_config_token(config_path)?;
    debug!(source = %config_path.display(), "auth token resolved");
    Some(token)
}

/// Like [`resolve_token`], failing when no source provides a token.
///
/// # Errors
///
/// Returns [`BridgeError::Config`] if neither source yields a token.
pub fn load_token(env_override: Option<String>, config_path: &Path) -> Result<AuthToken> {
    resolve_token(env_override, config_path).ok_or_else(|| {
        BridgeError::Config(format!(
            "no auth token configured: set {TOKEN_ENV} or \"authToken\" in {}",
            config_path.display()
        ))
    })
}

fn read_config_token(path: &Path) -> Option<AuthToken> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read config file");
            return None;
        }
    };
    match serde_json::from_str::<FileCredentials>(&raw) {
        Ok(parsed) => parsed.auth_token.and_then(AuthToken::new),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}
