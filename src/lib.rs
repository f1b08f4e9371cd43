// Core modules
mod config;
mod executors;
mod llm;
mod model;
mod orchestrator;
mod planner;

pub mod api;

// Re-export key types and functions
pub use config::Settings;
pub use executors::{
    BrowserExecutor, BrowserOutcome, CodeArtifact, CodeExecutor, CodeOutcome, StepExecutor,
};
pub use llm::{
    CompletionRequest, HttpLlmClient, LlmClient, LlmClientConfig, LlmError, MockLlmClient,
};
pub use model::{ExecutionStatus, Plan, PlanStep, StepStatus, TaskExecution, TaskStep};
pub use orchestrator::Orchestrator;
pub use planner::{LlmPlanner, Planner};

use anyhow::Result;
use std::sync::Arc;

/// Wire up a fully configured orchestrator from settings.
///
/// The planner and code executor share one LLM client; the browser executor
/// gets its own HTTP client for the automation sidecar.
pub fn build_orchestrator(settings: &Settings) -> Result<Arc<Orchestrator>> {
    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::new(LlmClientConfig {
        endpoint: settings.llm_endpoint.clone(),
        api_key: settings.llm_api_key.clone(),
        timeout_secs: settings.request_timeout_secs,
    })?);

    let planner = Arc::new(LlmPlanner::new(llm.clone(), settings.planner_model.clone()));
    let browser = Arc::new(BrowserExecutor::new(
        settings.browser_agent_url.clone(),
        settings.request_timeout_secs,
    )?);
    let swe = Arc::new(CodeExecutor::new(
        llm,
        settings.swe_model.clone(),
        settings.fallback_model.clone(),
    ));

    Ok(Arc::new(Orchestrator::new(planner, browser, swe)))
}
