//! Caller identity.
//!
//! Authentication itself is external. An [`IdentityProvider`] maps an opaque
//! bearer credential to an [`AuthenticatedCaller`], which every task
//! operation receives explicitly.

use crate::task::domain::OwnerId;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Handle for a caller whose identity has been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthenticatedCaller {
    owner: OwnerId,
}

impl AuthenticatedCaller {
    /// Wraps a verified owner identifier.
    #[must_use]
    pub const fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    /// Returns the caller's owner identifier.
    #[must_use]
    pub const fn owner(self) -> OwnerId {
        self.owner
    }
}

impl fmt::Display for AuthenticatedCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.owner)
    }
}

/// Resolves bearer credentials to callers.
pub trait IdentityProvider: Send + Sync {
    /// Returns the caller for `credential`, or `None` when it is unknown.
    fn authenticate(&self, credential: &str) -> Option<AuthenticatedCaller>;
}

/// Errors raised while loading identity configuration.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The token file could not be read.
    #[error("failed to read token file {path}: {source}")]
    Read {
        /// Path of the token file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The token file is not a JSON object of token to UUID.
    #[error("invalid token file {path}: {source}")]
    Parse {
        /// Path of the token file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Identity provider backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, OwnerId>,
}

impl StaticTokenProvider {
    /// Creates a provider from `(token, owner)` pairs.
    #[must_use]
    pub fn new(tokens: impl IntoIterator<Item = (String, OwnerId)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// Loads a provider from a JSON object mapping tokens to user UUIDs.
    ///
    /// ```json
    /// { "token-for-alice": "1f0c6c1e-3c55-4c38-9f5e-0d9f1f1f6a01" }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, IdentityError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| IdentityError::Read {
            path: display.clone(),
            source,
        })?;
        let parsed: HashMap<String, Uuid> =
            serde_json::from_str(&raw).map_err(|source| IdentityError::Parse {
                path: display,
                source,
            })?;
        Ok(Self::new(
            parsed
                .into_iter()
                .map(|(token, uuid)| (token, OwnerId::from_uuid(uuid))),
        ))
    }

    /// Returns the number of known tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns whether no tokens are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityProvider for StaticTokenProvider {
    fn authenticate(&self, credential: &str) -> Option<AuthenticatedCaller> {
        self.tokens
            .get(credential)
            .copied()
            .map(AuthenticatedCaller::new)
    }
}
