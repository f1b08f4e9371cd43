//! Task decomposition via the LLM.
//!
//! The planner turns a free-form task into an ordered [`Plan`] of subtasks,
//! each tagged with the executor kind that should run it.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::llm::{CompletionRequest, LlmClient, parser};
use crate::model::{Plan, PlanStep};

const SYSTEM_PROMPT: &str =
    "You are a planning agent that helps break down tasks for specialized AI agents.";

/// Produces a plan for a task. May fail on transport errors; malformed model
/// output is handled internally and never surfaces as an error.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, task: &str) -> Result<Plan>;
}

/// LLM-backed planner.
pub struct LlmPlanner {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl LlmPlanner {
    pub fn new(llm: Arc<dyn LlmClient>, model: String) -> Self {
        Self { llm, model }
    }

    fn build_user_prompt(task: &str) -> String {
        format!(
            "Task: {task}\n\
             Break this task into a list of subtasks. \
             Decide which of the following agents is best for each subtask:\n\
             - browser: for web browsing, search, or form-filling tasks.\n\
             - swe: for coding or computation tasks.\n\
             Provide the plan as JSON: {{\"steps\": [{{\"type\": ..., \"instruction\": ..., \
             \"dependencies\": [...]}}]}}. A step's dependencies list the zero-based indices \
             of earlier steps it needs; omit it when there are none."
        )
    }

    /// Turn cleaned model output into a [`Plan`].
    ///
    /// Accepts either the `{"steps": [...]}` object shape or a bare JSON
    /// array of steps. Anything else degrades to a single-step review plan
    /// so a chatty or confused model never aborts the task outright.
    fn parse_plan(cleaned: &str) -> Plan {
        if let Some(json) = parser::extract_json(cleaned) {
            if let Ok(plan) = serde_json::from_str::<Plan>(json) {
                if !plan.steps.is_empty() {
                    return plan;
                }
            }
            if let Ok(steps) = serde_json::from_str::<Vec<PlanStep>>(json) {
                if !steps.is_empty() {
                    return Plan::from_steps(steps);
                }
            }
        }

        warn!("planner output was not a usable plan, degrading to a review step");
        Plan::from_steps(vec![PlanStep {
            kind: "swe".to_string(),
            instruction: format!("Review and fix the following task output: {cleaned}"),
            dependencies: None,
        }])
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, task: &str) -> Result<Plan> {
        info!(model = %self.model, task_len = task.len(), "planning task");

        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: Self::build_user_prompt(task),
            model: self.model.clone(),
            temperature: 0.2,
            max_tokens: None,
        };

        let raw = self.llm.complete(request).await?;
        debug!(raw_len = raw.len(), "planner raw output");

        let cleaned = parser::strip_think_tags(&raw);
        let plan = Self::parse_plan(cleaned);
        info!(step_count = plan.steps.len(), "plan parsed");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn planner_with(response: &str) -> LlmPlanner {
        LlmPlanner::new(
            Arc::new(MockLlmClient {
                response: response.to_string(),
            }),
            "test-model".to_string(),
        )
    }

    #[tokio::test]
    async fn test_plan_parses_object_shape() {
        let planner = planner_with(
            r#"{"steps": [
                {"type": "browser", "instruction": "search flights"},
                {"type": "swe", "instruction": "summarize results", "dependencies": [0]}
            ]}"#,
        );

        let plan = planner.plan("Book a flight and summarize results").await.unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].kind, "browser");
        assert_eq!(plan.steps[1].dependencies, Some(vec![0]));
    }

    #[tokio::test]
    async fn test_plan_parses_bare_array() {
        let planner = planner_with(r#"[{"type": "swe", "instruction": "write a script"}]"#);

        let plan = planner.plan("write a script").await.unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].kind, "swe");
    }

    #[tokio::test]
    async fn test_plan_strips_think_tags() {
        let planner = planner_with(
            "<think>the user wants a search first</think>\n{\"steps\": [{\"type\": \"browser\", \"instruction\": \"search\"}]}",
        );

        let plan = planner.plan("search something").await.unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].instruction, "search");
    }

    #[tokio::test]
    async fn test_plan_degrades_on_malformed_output() {
        let planner = planner_with("I could not produce a plan, sorry!");

        let plan = planner.plan("do a thing").await.unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].kind, "swe");
        assert!(plan.steps[0].instruction.starts_with("Review and fix"));
    }

    #[tokio::test]
    async fn test_plan_degrades_on_empty_steps() {
        let planner = planner_with(r#"{"steps": []}"#);

        let plan = planner.plan("do a thing").await.unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert!(plan.steps[0].instruction.starts_with("Review and fix"));
    }
}
