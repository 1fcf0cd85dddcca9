//! Governed access to external providers.
//!
//! Every provider call goes through the [`PolicyRegistry`], which enforces a
//! per-provider in-flight cap, minimum-interval pacing derived from a
//! requests-per-minute budget, a hard per-call timeout, and a bounded retry
//! loop with exponential backoff and jitter. Faults are classified through
//! the [`ErrorCategory`] taxonomy; only `RateLimited` and `Transient` faults
//! are retried.
//!
//! The registry is an explicit object: construct one at process start and
//! share it by reference. There are no module-level globals.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rubriq::policy::{PolicyConfig, PolicyRegistry, ProviderFault};
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let policy = PolicyRegistry::new(PolicyConfig::default());
//! let cancel = CancellationToken::new();
//!
//! let result = policy
//!     .invoke("openai", &cancel, |attempt| async move {
//!         if attempt < 2 {
//!             Err(ProviderFault::msg("429 too many requests").with_status(429))
//!         } else {
//!             Ok(json!({"answer": 42}))
//!         }
//!     })
//!     .await;
//! assert!(result.success);
//! # }
//! ```

mod classify;
mod credentials;
mod invoker;
mod registry;

pub use classify::{classify, ErrorCategory, ProviderFault};
pub use credentials::{Credential, CredentialError, CredentialStore, StaticCredentialStore};
pub use invoker::{PolicyConfig, RetryPolicy};
pub use registry::{InvocationResult, PolicyRegistry};
