use std::time::Duration;
use thiserror::Error;

use crate::agent::AgentKind;

/// Errors raised while building a key pool
#[derive(Debug, Error)]
pub enum KeyPoolError {
    #[error("key pool needs at least one credential")]
    Empty,
}

/// A failed remote completion call.
///
/// The variants only describe what happened; whether a failure is worth
/// rotating credentials for is decided by the agent's retry policy.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompletionError {
    /// Whether the failure is attributable to the credential's quota.
    /// Timeouts count as well, since a throttled key often stalls instead of
    /// answering 429.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Timeout(_))
    }
}

/// Failure of a single agent invocation
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} agent failed on both attempts (first: {first}; retry: {second})")]
    RetryExhausted {
        agent: AgentKind,
        first: CompletionError,
        second: CompletionError,
    },

    #[error("{agent} agent failed without retry: {source}")]
    NotRetried {
        agent: AgentKind,
        #[source]
        source: CompletionError,
    },
}

impl AgentError {
    pub fn agent(&self) -> AgentKind {
        match self {
            Self::RetryExhausted { agent, .. } | Self::NotRetried { agent, .. } => *agent,
        }
    }
}

/// Errors from the flat-file history and user stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
