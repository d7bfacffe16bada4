use async_trait::async_trait;

use crate::agent::interface::Message;
use crate::agent::key_pool::Credential;
use crate::error::CompletionError;

/// Interface for a stateless language model.
///
/// Stateless means the model keeps no memory between calls: the system
/// prompt, history and task all travel in `messages`, and the credential to
/// authenticate with is chosen by the caller on every call.
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Run one chat completion and return the generated text
    async fn chat_completion(
        &self,
        credential: &Credential,
        messages: &[Message],
    ) -> Result<String, CompletionError>;
}
