use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::key_pool::Credential;

/// Environment variable consulted when the config lists no usable keys
pub const API_KEYS_ENV: &str = "GROQ_API_KEYS";

/// How an agent reacts to a failed completion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Any failure retires the key and is retried once with a fresh one
    #[default]
    Uniform,
    /// Only rate-limit and timeout failures rotate and retry; anything else
    /// fails the call immediately
    Classified,
}

/// Configuration for the OpenAI-compatible LLM provider and its key pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_llm_provider")]
    pub llm_provider: String,

    /// Overrides the provider's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    /// Ordered credential list; `${VAR}` placeholders are resolved at load
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Bound on a single completion call; `0` disables the timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub retry_policy: RetryPolicy,

    /// Exhausted keys become usable again after this many seconds.
    /// Absent means a key stays retired until restart.
    #[serde(default)]
    pub key_cooldown_secs: Option<u64>,
}

fn default_llm_provider() -> String {
    "groq_llm".to_string()
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl LLMConfig {
    /// Credentials in configured order.
    ///
    /// Blank entries and placeholders the environment could not resolve are
    /// skipped. When nothing is left, `GROQ_API_KEYS` (comma separated) is
    /// used instead.
    pub fn credentials(&self) -> Vec<Credential> {
        let configured = usable_keys(self.api_keys.iter().map(String::as_str));
        if !configured.is_empty() {
            return configured;
        }

        match std::env::var(API_KEYS_ENV) {
            Ok(raw) => usable_keys(raw.split(',')),
            Err(_) => Vec::new(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn key_cooldown(&self) -> Option<Duration> {
        self.key_cooldown_secs.map(Duration::from_secs)
    }
}

fn usable_keys<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<Credential> {
    keys.map(str::trim)
        .filter(|k| !k.is_empty() && !(k.starts_with("${") && k.ends_with('}')))
        .map(Credential::from)
        .collect()
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_llm_provider(),
            base_url: None,
            model: default_model(),
            temperature: 0.0,
            api_keys: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_policy: RetryPolicy::default(),
            key_cooldown_secs: None,
        }
    }
}
