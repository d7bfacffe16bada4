use serde::{Deserialize, Serialize};
use crate::config_manager::agent::PipelineConfig;
use crate::config_manager::stateless_llm::LLMConfig;
use crate::config_manager::system::SystemConfig;

/// Main configuration for the application (JSON-LD or YAML)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "@context")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,

    #[serde(default)]
    pub system_config: SystemConfig,

    #[serde(default)]
    pub llm_config: LLMConfig,

    #[serde(default)]
    pub pipeline_config: PipelineConfig,
}

impl Config {
    /// Load configuration from a JSON-LD or YAML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        use crate::config_manager::utils::{read_config_value, validate_config};
        let value = read_config_value(path)?;
        validate_config(&value)
    }

    /// Try each candidate path in turn and return the first config that loads,
    /// together with the path it came from.
    pub fn load_first<I, S>(paths: I) -> anyhow::Result<(Self, String)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tried = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match Self::load(path) {
                Ok(config) => return Ok((config, path.to_string())),
                Err(e) => {
                    tracing::debug!("Failed to load config from {}: {}", path, e);
                    tried.push(path.to_string());
                }
            }
        }
        anyhow::bail!("Could not find config file. Tried: {:?}", tried)
    }
}
