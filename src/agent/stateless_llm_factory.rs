use std::sync::Arc;
use tracing::info;
use anyhow::Result;

use crate::agent::stateless_llm::{OpenAICompatibleLLM, StatelessLLMInterface};
use crate::config_manager::LLMConfig;

/// Factory for creating stateless LLM instances
pub struct StatelessLLMFactory;

impl StatelessLLMFactory {
    /// Default endpoint of a known provider
    pub fn default_base_url(llm_provider: &str) -> Option<&'static str> {
        match llm_provider {
            "groq_llm" => Some("https://api.groq.com/openai/v1"),
            "openai_llm" => Some("https://api.openai.com/v1"),
            "deepseek_llm" => Some("https://api.deepseek.com/v1"),
            "mistral_llm" => Some("https://api.mistral.ai/v1"),
            _ => None,
        }
    }

    /// Create an LLM based on the configuration.
    ///
    /// Every supported provider speaks the OpenAI chat completion protocol;
    /// they differ only in default endpoint. `openai_compatible_llm` has no
    /// default and needs `base_url`.
    pub fn create_llm(config: &LLMConfig) -> Result<Arc<dyn StatelessLLMInterface>> {
        let provider = config.llm_provider.as_str();
        info!("Initializing LLM: {}", provider);

        let base_url = match provider {
            "groq_llm" | "openai_llm" | "deepseek_llm" | "mistral_llm" => config
                .base_url
                .clone()
                .or_else(|| Self::default_base_url(provider).map(str::to_string)),
            "openai_compatible_llm" => config.base_url.clone(),
            _ => anyhow::bail!("Unsupported LLM provider: {}", provider),
        }
        .ok_or_else(|| anyhow::anyhow!("base_url is required for {}", provider))?;

        let client = reqwest::Client::builder().build()?;
        Ok(Arc::new(OpenAICompatibleLLM::new(
            client,
            config.model.clone(),
            base_url,
            config.temperature,
        )))
    }
}
