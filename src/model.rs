//! Data model for plans and task executions.
//!
//! These types are the wire format of the polling API: everything here
//! serializes to the same JSON shapes the HTTP layer exposes, so status
//! strings are lowercase and step `type` keeps whatever the planner emitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of a single step within a task execution.
///
/// Transitions: `Pending -> Running -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Lifecycle of a whole task execution.
///
/// Transitions: `Pending -> Planning -> Executing -> {Completed, Failed}`;
/// planning failures short-circuit straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Planning,
    Executing,
    Completed,
    Failed,
}

/// One subtask descriptor as produced by the planner.
///
/// Defaults are deliberately forgiving: a missing `type` becomes the
/// `"unknown"` sentinel so the step fails at dispatch time rather than while
/// the plan is being built, and a missing `instruction` becomes empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanStep {
    #[serde(rename = "type", default = "unknown_kind")]
    pub kind: String,
    #[serde(default)]
    pub instruction: String,
    /// Indices of steps that must be completed first. Signed because the
    /// planner is an LLM and may emit anything; out-of-range values are
    /// ignored at gating time.
    #[serde(default)]
    pub dependencies: Option<Vec<i64>>,
}

fn unknown_kind() -> String {
    "unknown".to_string()
}

/// Ordered list of subtask descriptors returned by the planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    #[serde(default)]
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub context: Option<Value>,
}

impl Plan {
    /// Wrap a list of step descriptors with no extra context.
    pub fn from_steps(steps: Vec<PlanStep>) -> Self {
        Self {
            steps,
            context: None,
        }
    }
}

/// One step of a task execution, built from a [`PlanStep`] and mutated in
/// place by the orchestrator as the step progresses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStep {
    pub step_index: usize,
    /// Executor kind ("browser" or "swe"), matched case-insensitively at
    /// dispatch time. Unrecognized values fail the step then, not earlier.
    #[serde(rename = "type")]
    pub kind: String,
    pub instruction: String,
    #[serde(default)]
    pub dependencies: Vec<i64>,
    pub status: StepStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl TaskStep {
    /// Build a pending step from its plan descriptor, preserving order.
    pub fn from_plan(index: usize, step: &PlanStep) -> Self {
        Self {
            step_index: index,
            kind: step.kind.clone(),
            instruction: step.instruction.clone(),
            dependencies: step.dependencies.clone().unwrap_or_default(),
            status: StepStatus::Pending,
            result: None,
            error: None,
        }
    }
}

/// The mutable record tracking one task's end-to-end run across its steps.
///
/// The orchestrator is the sole mutator; API callers only ever see cloned
/// snapshots read out of the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskExecution {
    pub task_id: String,
    pub original_task: String,
    pub status: ExecutionStatus,
    pub steps: Vec<TaskStep>,
    pub current_step: usize,
    /// Recap of all steps; set only when `status == Completed`.
    pub result: Option<Value>,
    /// Human-readable failure description; set only when `status == Failed`.
    pub error: Option<String>,
}

impl TaskExecution {
    pub fn new(task_id: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            original_task: task.into(),
            status: ExecutionStatus::Pending,
            steps: Vec::new(),
            current_step: 0,
            result: None,
            error: None,
        }
    }
}
