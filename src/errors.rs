use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded fault with scope, cause chain, tags, and free-form context.
///
/// Error entries accumulate in [`GlobalState`](crate::state::GlobalState)
/// under the append reducer; they never halt a job by themselves.
///
/// # JSON Serialization Format
///
/// `ErrorEntry` serializes to JSON with the following structure:
///
/// ```json
/// {
///   "when": "2026-08-30T10:30:00Z",
///   "scope": {
///     "scope": "node",
///     "node": "style_check",
///     "layer": 1
///   },
///   "fault": {
///     "message": "provider call failed",
///     "cause": {
///       "message": "429 Too Many Requests",
///       "cause": null,
///       "details": {"attempts": 3}
///     },
///     "details": null
///   },
///   "tags": ["provider", "retryable"],
///   "context": {"provider": "openai"}
/// }
/// ```
///
/// The `scope` field uses a tagged union with the discriminator `"scope"`.
///
/// # Examples
///
/// ```
/// use rubriq::errors::{ErrorEntry, Fault};
/// use serde_json::json;
///
/// let entry = ErrorEntry::node("style_check", 1, Fault::msg("parse error"))
///     .with_tag("validation")
///     .with_context(json!({"line": 42}));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ErrorEntry {
    #[serde(default = "chrono::Utc::now")]
    pub when: DateTime<Utc>,
    #[serde(default)]
    pub scope: ErrorScope,
    #[serde(default)]
    pub fault: Fault,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub context: serde_json::Value,
}

impl ErrorEntry {
    /// Create a node-scoped error entry.
    pub fn node<S: Into<String>>(node: S, layer: usize, fault: Fault) -> Self {
        Self {
            when: Utc::now(),
            scope: ErrorScope::Node {
                node: node.into(),
                layer,
            },
            fault,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Create a provider-scoped error entry.
    pub fn provider<S: Into<String>>(provider: S, fault: Fault) -> Self {
        Self {
            when: Utc::now(),
            scope: ErrorScope::Provider {
                provider: provider.into(),
            },
            fault,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Create a job-scoped error entry.
    pub fn job<S: Into<String>>(job: S, fault: Fault) -> Self {
        Self {
            when: Utc::now(),
            scope: ErrorScope::Job { job: job.into() },
            fault,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Create an engine-scoped error entry.
    pub fn engine(fault: Fault) -> Self {
        Self {
            when: Utc::now(),
            scope: ErrorScope::Engine,
            fault,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ErrorScope {
    Node {
        node: String,
        layer: usize,
    },
    Provider {
        provider: String,
    },
    Job {
        job: String,
    },
    #[default]
    Engine,
}

/// A message with an optional nested cause and structured details.
///
/// Forms a cause chain the same way `std::error::Error::source` does, but
/// stays serializable so it can travel inside state and job reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fault {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Fault>>,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl Default for Fault {
    fn default() -> Self {
        Fault {
            message: String::new(),
            cause: None,
            details: serde_json::Value::Null,
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c as &dyn std::error::Error)
    }
}

impl Fault {
    pub fn msg<M: Into<String>>(m: M) -> Self {
        Fault {
            message: m.into(),
            cause: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_cause(mut self, cause: Fault) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}
