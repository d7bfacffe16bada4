use serde::{Deserialize, Serialize};

/// Settings for the agent pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run the symptom and lifestyle agents concurrently. Neither consumes the
    /// other's output, so only the order of their turns in shared memory
    /// changes.
    #[serde(default)]
    pub parallel_independent_agents: bool,

    /// Number of knowledge snippets handed to the diet agent
    #[serde(default = "default_knowledge_top_k")]
    pub knowledge_top_k: usize,
}

fn default_knowledge_top_k() -> usize {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_independent_agents: false,
            knowledge_top_k: default_knowledge_top_k(),
        }
    }
}
