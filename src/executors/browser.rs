//! Browser executor: forwards an instruction to a browser-automation agent
//! sidecar and relays its structured result.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{StepExecutor, retry_with_backoff};

/// Result shape produced by the browser agent.
///
/// `success: false` with an `error` message is a normal payload, not a
/// dispatch failure; the agent reports its own navigation errors this way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOutcome {
    pub success: bool,
    #[serde(default)]
    pub steps: Vec<Value>,
    #[serde(default)]
    pub final_result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Executor that drives a browser-automation agent over HTTP.
///
/// The sidecar exposes `POST /run` taking `{"task": ...}` and answering with
/// a [`BrowserOutcome`]. Transport failures are retried once with backoff.
pub struct BrowserExecutor {
    client: reqwest::Client,
    base_url: String,
}

impl BrowserExecutor {
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build browser agent client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call_agent(&self, instruction: &str) -> Result<BrowserOutcome> {
        let url = format!("{}/run", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "task": instruction }))
            .send()
            .await
            .context("browser agent request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("browser agent returned HTTP {}: {}", status, text));
        }

        response
            .json::<BrowserOutcome>()
            .await
            .context("browser agent returned an unparseable body")
    }
}

#[async_trait]
impl StepExecutor for BrowserExecutor {
    async fn run(&self, instruction: &str) -> Result<Value> {
        info!(instruction, "executing browser task");

        let outcome = retry_with_backoff(2, "browser agent", || self.call_agent(instruction)).await?;

        serde_json::to_value(&outcome).context("failed to serialize browser outcome")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_tolerates_missing_optional_fields() {
        let outcome: BrowserOutcome = serde_json::from_value(json!({
            "success": true
        }))
        .unwrap();

        assert!(outcome.success);
        assert!(outcome.steps.is_empty());
        assert!(outcome.final_result.is_none());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let executor = BrowserExecutor::new("http://127.0.0.1:7788/".to_string(), 30).unwrap();
        assert_eq!(executor.base_url, "http://127.0.0.1:7788");
    }
}
