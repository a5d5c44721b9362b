use std::env;

use anyhow::Context;

/// Default model identifier requested when `AGENT_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-72B-Instruct";

/// Endpoint configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Config {
    /// Reads `AGENT_API_KEY`, `AGENT_BASE_URL`, and optionally `AGENT_MODEL`.
    ///
    /// Key and base URL are required; the error names the missing variable.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("AGENT_API_KEY")
            .context("environment variable AGENT_API_KEY is not set")?;
        let base_url = env::var("AGENT_BASE_URL")
            .context("environment variable AGENT_BASE_URL is not set")?;
        let model = env::var("AGENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}
