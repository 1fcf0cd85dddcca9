//! Credential resolution for provider calls.
//!
//! Credentials are resolved per call through the [`CredentialStore`] trait;
//! the engine holds the store by `Arc` and never persists what it returns.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// A resolved provider credential.
///
/// The secret is deliberately excluded from `Debug` output.
#[derive(Clone)]
pub struct Credential {
    pub provider: String,
    secret: String,
}

impl Credential {
    pub fn new(provider: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            secret: secret.into(),
        }
    }

    /// Access the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CredentialError {
    #[error("no credential configured for provider: {provider}")]
    #[diagnostic(
        code(rubriq::credentials::missing),
        help("Register a credential for this provider in your CredentialStore.")
    )]
    Missing { provider: String },

    #[error("credential backend error: {message}")]
    #[diagnostic(code(rubriq::credentials::backend))]
    Backend { message: String },
}

/// External credential resolver.
///
/// Implementations may read from a vault, the environment, or anything
/// else; the engine only calls [`credential`](Self::credential) at the
/// moment a provider call needs one.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn credential(&self, provider: &str) -> Result<Credential, CredentialError>;
}

/// In-memory credential store for tests and simple embeddings.
#[derive(Default)]
pub struct StaticCredentialStore {
    secrets: FxHashMap<String, String>,
}

impl StaticCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(
        mut self,
        provider: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.secrets.insert(provider.into(), secret.into());
        self
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn credential(&self, provider: &str) -> Result<Credential, CredentialError> {
        self.secrets
            .get(provider)
            .map(|secret| Credential::new(provider, secret))
            .ok_or_else(|| CredentialError::Missing {
                provider: provider.to_string(),
            })
    }
}
