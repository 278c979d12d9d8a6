//! # Authenticator
//!
//! Bearer-token check for protected routes.
//!
//! ## Security Notes
//!
//! - Comparison goes through [`subtle::ConstantTimeEq`]: every byte pair is
//!   compared and the results combined without branching, so timing does not
//!   depend on where the first mismatch is.
//! - Lengths are compared first. That leaks the token length, which is fixed
//!   and not secret.
//! - Missing header, wrong scheme and wrong token are distinct failures for
//!   logging and tests. Callers see only a generic 401.

use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::credentials::AuthToken;

/// Why a request failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No `Authorization` header.
    #[error("missing authorization header")]
    MissingHeader,

    /// Header present but not `Bearer <token>`.
    #[error("authorization scheme is not Bearer")]
    WrongScheme,

    /// Bearer token does not match.
    #[error("invalid token")]
    InvalidToken,
}

/// Verifies presented bearer tokens against the stored one.
#[derive(Debug, Clone)]
pub struct Authenticator {
    token: AuthToken,
}

impl Authenticator {
    /// Creates an authenticator for `token`.
    pub fn new(token: AuthToken) -> Self {
        Self { token }
    }

    /// Check the raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthFailure`] describing why the header was rejected.
    pub fn verify(&self, header: Option<&str>) -> Result<(), AuthFailure> {
        let header = header.ok_or(AuthFailure::MissingHeader)?;
        let presented = header
            .strip_prefix("Bearer ")
            .ok_or(AuthFailure::WrongScheme)?;

        if constant_time_eq(presented.as_bytes(), self.token.expose().as_bytes()) {
            Ok(())
        } else {
            Err(AuthFailure::InvalidToken)
        }
    }
}

/// Length check, then a full-length constant-time byte comparison.
pub fn constant_time_eq(presented: &[u8], expected: &[u8]) -> bool {
    presented.len() == expected.len() && bool::from(presented.ct_eq(expected))
}
