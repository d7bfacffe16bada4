use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use anyhow::Result;
use regex::Regex;
use serde_json::Value;

use crate::config_manager::main::Config;

fn env_placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid"))
}

/// Replace `${VAR_NAME}` with the environment value; unknown variables are
/// left as written.
pub fn substitute_env_vars(content: &str) -> String {
    env_placeholder()
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Read a JSON-LD, JSON or YAML configuration file with environment variable
/// substitution. The format is picked by extension; anything that is not
/// `.jsonld`/`.json` is parsed as YAML.
pub fn read_config_value(config_path: &str) -> Result<Value> {
    if !Path::new(config_path).exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let content = load_text_file_with_guess_encoding(config_path)?;
    if content.trim().is_empty() {
        anyhow::bail!("Configuration file is empty: {}", config_path);
    }

    let content = substitute_env_vars(&content);

    let lower = config_path.to_lowercase();
    let value: Value = if lower.ends_with(".jsonld") || lower.ends_with(".json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(value)
}

/// Validate configuration data against the Config model
pub fn validate_config(config_data: &Value) -> Result<Config> {
    let config: Config = serde_json::from_value(config_data.clone())?;
    if config.llm_config.model.trim().is_empty() {
        anyhow::bail!("llm_config.model must not be empty");
    }
    Ok(config)
}

/// Load text file, stripping a UTF-8 BOM and falling back to GBK for
/// files that are not valid UTF-8.
pub fn load_text_file_with_guess_encoding(file_path: &str) -> Result<String> {
    let mut bytes = fs::read(file_path)?;
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let (cow, _, _) = encoding_rs::GBK.decode(err.as_bytes());
            Ok(cow.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_placeholder_is_kept() {
        let out = substitute_env_vars("key: ${HEALTH_AGENTS_SURELY_UNSET_VAR}");
        assert_eq!(out, "key: ${HEALTH_AGENTS_SURELY_UNSET_VAR}");
    }

    #[test]
    fn known_placeholder_is_replaced() {
        let out = substitute_env_vars("home=${PATH}");
        assert!(!out.contains("${PATH}"));
    }
}
