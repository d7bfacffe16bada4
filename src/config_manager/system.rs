use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// System configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_conf_version")]
    pub conf_version: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `history.json` and `users.json`
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Directory of `.txt`/`.md` files the diet agent draws snippets from
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: String,
}

fn default_conf_version() -> String {
    "v1.0.0".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_storage_dir() -> String {
    "storage".to_string()
}

fn default_knowledge_dir() -> String {
    "knowledge_base".to_string()
}

impl SystemConfig {
    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir).join("history.json")
    }

    pub fn users_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir).join("users.json")
    }

    pub fn knowledge_path(&self) -> PathBuf {
        PathBuf::from(&self.knowledge_dir)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            conf_version: default_conf_version(),
            host: default_host(),
            port: default_port(),
            storage_dir: default_storage_dir(),
            knowledge_dir: default_knowledge_dir(),
        }
    }
}
