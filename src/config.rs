//! Environment-driven settings.
//!
//! Everything has a workable default except the API key, which stays
//! optional so the mock-backed tests and local inference servers need no
//! environment at all.

use std::env;

/// Free-tier Together models; override via environment for other providers.
const DEFAULT_ENDPOINT: &str = "https://api.together.xyz/v1/chat/completions";
const DEFAULT_PLANNER_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free";
const DEFAULT_SWE_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";
const DEFAULT_BROWSER_AGENT_URL: &str = "http://127.0.0.1:7788";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Chat completions endpoint (OpenAI-compatible).
    pub llm_endpoint: String,
    pub llm_api_key: Option<String>,
    pub planner_model: String,
    pub swe_model: String,
    /// Model tried when the primary code-generation model fails.
    pub fallback_model: String,
    /// Base URL of the browser-automation agent sidecar.
    pub browser_agent_url: String,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            llm_endpoint: env_or("LLM_ENDPOINT", DEFAULT_ENDPOINT),
            llm_api_key: env::var("LLM_API_KEY").ok(),
            planner_model: env_or("PLANNER_MODEL", DEFAULT_PLANNER_MODEL),
            swe_model: env_or("SWE_MODEL", DEFAULT_SWE_MODEL),
            fallback_model: env_or("FALLBACK_MODEL", DEFAULT_PLANNER_MODEL),
            browser_agent_url: env_or("BROWSER_AGENT_URL", DEFAULT_BROWSER_AGENT_URL),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
