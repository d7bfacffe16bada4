use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::agent::agents::AgentKind;
use crate::agent::interface::Message;
use crate::agent::key_pool::{Credential, KeyPool};
use crate::agent::shared_memory::SharedMemory;
use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::config_manager::RetryPolicy;
use crate::error::{AgentError, CompletionError};
use crate::knowledge::{KnowledgeRetriever, NoKnowledge};

/// Handles an agent needs for one pipeline run.
///
/// Nothing here is global: the pipeline driver builds a context per run with
/// a fresh [`SharedMemory`], while the key pool handle is usually shared
/// between runs so exhaustion is remembered.
#[derive(Clone)]
pub struct AgentContext {
    pub key_pool: Arc<KeyPool>,
    pub memory: Arc<SharedMemory>,
    pub llm: Arc<dyn StatelessLLMInterface>,
    pub retriever: Arc<dyn KnowledgeRetriever>,
    pub retry_policy: RetryPolicy,
    pub timeout: Option<Duration>,
}

impl AgentContext {
    pub fn new(key_pool: Arc<KeyPool>, llm: Arc<dyn StatelessLLMInterface>) -> Self {
        Self {
            key_pool,
            memory: Arc::new(SharedMemory::new()),
            llm,
            retriever: Arc::new(NoKnowledge),
            retry_policy: RetryPolicy::default(),
            timeout: None,
        }
    }

    pub fn with_memory(mut self, memory: Arc<SharedMemory>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn KnowledgeRetriever>) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same handles, but a fresh empty transcript
    pub fn fresh_run(&self) -> Self {
        self.clone().with_memory(Arc::new(SharedMemory::new()))
    }

    async fn attempt(
        &self,
        credential: &Credential,
        messages: &[Message],
    ) -> Result<String, CompletionError> {
        let call = self.llm.chat_completion(credential, messages);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| CompletionError::Timeout(limit))?,
            None => call.await,
        }
    }

    /// Call the model with a pooled credential, retrying exactly once.
    ///
    /// On the first failure the credential is marked exhausted and the call is
    /// repeated with the next one from the pool. A second failure marks that
    /// credential too and is returned as [`AgentError::RetryExhausted`]. Under
    /// [`RetryPolicy::Classified`], failures that are not rate limits or
    /// timeouts skip the retry and leave the credential alone.
    pub async fn complete_with_retry(
        &self,
        agent: AgentKind,
        messages: &[Message],
    ) -> Result<String, AgentError> {
        let credential = self.key_pool.next();
        let first = match self.attempt(&credential, messages).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        if self.retry_policy == RetryPolicy::Classified && !first.is_rate_limit() {
            error!(agent = %agent, key = %credential, error = %first, "Completion failed, not retrying");
            return Err(AgentError::NotRetried {
                agent,
                source: first,
            });
        }

        warn!(
            agent = %agent,
            key = %credential,
            error = %first,
            "Completion failed, rotating key and retrying once"
        );
        self.key_pool.mark_exhausted(&credential);

        let retry_credential = self.key_pool.next();
        match self.attempt(&retry_credential, messages).await {
            Ok(text) => Ok(text),
            Err(second) => {
                self.key_pool.mark_exhausted(&retry_credential);
                error!(
                    agent = %agent,
                    key = %retry_credential,
                    error = %second,
                    "Retry failed"
                );
                Err(AgentError::RetryExhausted {
                    agent,
                    first,
                    second,
                })
            }
        }
    }
}
