//! Code executor: asks the LLM for a solution and shapes the answer into a
//! structured code artifact.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{StepExecutor, retry_with_backoff};
use crate::llm::{CompletionRequest, LlmClient, parser};

const SYSTEM_PROMPT: &str = "You are an expert software engineer with deep knowledge of \
programming languages, frameworks, and best practices. Write high-quality, efficient, and \
well-documented code based on the user's requirements.\n\n\
Guidelines:\n\
- Write clean, readable, and maintainable code\n\
- Include appropriate error handling\n\
- Follow best practices for the specific language or framework\n\
- Consider edge cases and potential issues\n\
- Include imports and dependencies as needed\n\n\
Structure your response as: the complete solution in a fenced code block, followed by a \
brief explanation of how it works and any assumptions made.";

/// Generated code plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeArtifact {
    pub code: String,
    pub language: String,
    pub explanation: Option<String>,
}

/// Result shape produced by the code executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeOutcome {
    pub success: bool,
    #[serde(default)]
    pub result: Option<CodeArtifact>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Executor that generates code via the LLM.
///
/// Each attempt tries the primary model and falls back to the secondary
/// model before counting as failed; the whole call is retried with backoff.
pub struct CodeExecutor {
    llm: Arc<dyn LlmClient>,
    model: String,
    fallback_model: String,
}

impl CodeExecutor {
    pub fn new(llm: Arc<dyn LlmClient>, model: String, fallback_model: String) -> Self {
        Self {
            llm,
            model,
            fallback_model,
        }
    }

    fn request_for(&self, model: &str, instruction: &str) -> CompletionRequest {
        CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("Task: {instruction}\n\nPlease provide a complete solution for this task."),
            model: model.to_string(),
            temperature: 0.2,
            max_tokens: Some(4096),
        }
    }

    async fn generate(&self, instruction: &str) -> Result<String> {
        match self.llm.complete(self.request_for(&self.model, instruction)).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(
                    model = %self.model,
                    fallback = %self.fallback_model,
                    error = %e,
                    "primary model failed, falling back"
                );
                self.llm
                    .complete(self.request_for(&self.fallback_model, instruction))
                    .await
                    .context("fallback model failed")
            }
        }
    }

    /// Shape a raw model answer into a [`CodeOutcome`].
    ///
    /// Prefers the first fenced code block; without one, the whole answer is
    /// treated as code and the language is guessed from its content.
    fn shape_outcome(text: &str) -> CodeOutcome {
        let artifact = match parser::extract_code_block(text) {
            Some((language, code)) => {
                let explanation = parser::strip_code_blocks(text);
                CodeArtifact {
                    code,
                    language,
                    explanation: (!explanation.is_empty()).then_some(explanation),
                }
            }
            None => CodeArtifact {
                code: text.to_string(),
                language: parser::guess_language(text).to_string(),
                explanation: Some("No separate explanation provided.".to_string()),
            },
        };

        CodeOutcome {
            success: true,
            result: Some(artifact),
            error: None,
        }
    }
}

#[async_trait]
impl StepExecutor for CodeExecutor {
    async fn run(&self, instruction: &str) -> Result<Value> {
        info!(instruction, "running code generation");

        let text = retry_with_backoff(3, "code generation", || self.generate(instruction)).await?;
        let outcome = Self::shape_outcome(&text);

        serde_json::to_value(&outcome).context("failed to serialize code outcome")
    }
}
