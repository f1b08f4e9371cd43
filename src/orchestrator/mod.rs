//! Core orchestrator: owns the execution registry, sequences plan steps,
//! gates on declared dependencies, and records per-step results.
//!
//! Failure semantics are fail-fast: the first failing step (unmet dependency,
//! unknown type, or executor error) terminates the whole execution. Nothing
//! escapes [`Orchestrator::execute_task`] as an error; callers always get a
//! (possibly failed) execution record, and polls read whatever has been
//! published so far.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::executors::StepExecutor;
use crate::model::{ExecutionStatus, StepStatus, TaskExecution, TaskStep};
use crate::planner::Planner;

/// Coordinates the planner and the step executors for every task.
///
/// The registry maps `task_id -> TaskExecution`. Each running task mutates a
/// private working copy and publishes cloned snapshots at every observable
/// transition, so concurrent polls see consistent records without holding a
/// lock across executor calls. Entries are never removed; the registry grows
/// for the lifetime of the process.
pub struct Orchestrator {
    planner: Arc<dyn Planner>,
    browser: Arc<dyn StepExecutor>,
    swe: Arc<dyn StepExecutor>,
    executions: RwLock<HashMap<String, TaskExecution>>,
}

impl Orchestrator {
    pub fn new(
        planner: Arc<dyn Planner>,
        browser: Arc<dyn StepExecutor>,
        swe: Arc<dyn StepExecutor>,
    ) -> Self {
        Self {
            planner,
            browser,
            swe,
            executions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a `planning` record for the task, then run it to completion
    /// in a background task.
    ///
    /// The registry insert happens before this returns, so a poll issued
    /// right after the enclosing request never sees "not found".
    pub async fn spawn_task(self: &Arc<Self>, task_id: String, task: String) {
        let mut execution = TaskExecution::new(task_id.as_str(), task.as_str());
        execution.status = ExecutionStatus::Planning;
        self.publish(&execution).await;

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.execute_task(&task_id, &task).await;
        });
    }

    /// Execute a task end to end and return the final execution record.
    ///
    /// A duplicate `task_id` silently overwrites the prior record; id
    /// uniqueness is the caller's responsibility.
    pub async fn execute_task(&self, task_id: &str, task: &str) -> TaskExecution {
        info!(task_id, task, "executing task");

        let mut execution = TaskExecution::new(task_id, task);
        execution.status = ExecutionStatus::Planning;
        self.publish(&execution).await;

        let plan = match self.planner.plan(task).await {
            Ok(plan) => plan,
            Err(e) => {
                error!(task_id, error = %e, "planning failed");
                execution.status = ExecutionStatus::Failed;
                execution.error = Some(e.to_string());
                self.publish(&execution).await;
                return execution;
            }
        };

        execution.steps = plan
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| TaskStep::from_plan(i, step))
            .collect();
        execution.status = ExecutionStatus::Executing;
        self.publish(&execution).await;

        for i in 0..execution.steps.len() {
            execution.current_step = i;

            // Gate on this step's own declared dependencies. Indices outside
            // the plan are ignored; a forward reference can never be
            // completed yet and deterministically fails here.
            let unmet = execution.steps[i].dependencies.iter().copied().find(|&dep| {
                dep >= 0
                    && (dep as usize) < execution.steps.len()
                    && execution.steps[dep as usize].status != StepStatus::Completed
            });

            if let Some(dep) = unmet {
                warn!(task_id, step = i, dependency = dep, "dependency not completed");
                let message = format!("Dependency {dep} not completed");
                execution.steps[i].status = StepStatus::Failed;
                execution.steps[i].error = Some(message.clone());
                execution.status = ExecutionStatus::Failed;
                execution.error = Some(format!("Step {i} failed: {message}"));
                self.publish(&execution).await;
                return execution;
            }

            if let Err(e) = self.execute_step(task_id, &mut execution, i).await {
                execution.status = ExecutionStatus::Failed;
                execution.error = Some(format!("Step {i} failed: {e}"));
                self.publish(&execution).await;
                return execution;
            }
            self.publish(&execution).await;
        }

        execution.status = ExecutionStatus::Completed;
        execution.result = Some(serde_json::json!({ "steps": execution.steps }));
        self.publish(&execution).await;
        execution
    }

    /// Run one step: mark it running, dispatch by kind, record the outcome.
    ///
    /// An executor payload reporting `success: false` is still a successful
    /// dispatch; the payload is stored as the step result and the step
    /// completes. Only a returned error fails the step.
    async fn execute_step(
        &self,
        task_id: &str,
        execution: &mut TaskExecution,
        index: usize,
    ) -> Result<()> {
        let (kind, instruction) = {
            let step = &execution.steps[index];
            (step.kind.clone(), step.instruction.clone())
        };
        info!(task_id, step = index, kind, "executing step");

        execution.steps[index].status = StepStatus::Running;
        self.publish(execution).await;

        let dispatched = match kind.to_lowercase().as_str() {
            "browser" => self.browser.run(&instruction).await,
            "swe" => self.swe.run(&instruction).await,
            _ => Err(anyhow!("Unknown step type: {kind}")),
        };

        let step = &mut execution.steps[index];
        match dispatched {
            Ok(result) => {
                step.status = StepStatus::Completed;
                step.result = Some(result);
                Ok(())
            }
            Err(e) => {
                error!(task_id, step = index, error = %e, "step failed");
                step.status = StepStatus::Failed;
                step.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Look up one execution by id, as a snapshot.
    pub async fn get_execution(&self, task_id: &str) -> Option<TaskExecution> {
        self.executions.read().await.get(task_id).cloned()
    }

    /// Snapshot of every tracked execution, including in-progress ones.
    pub async fn list_executions(&self) -> HashMap<String, TaskExecution> {
        self.executions.read().await.clone()
    }

    async fn publish(&self, execution: &TaskExecution) {
        self.executions
            .write()
            .await
            .insert(execution.task_id.clone(), execution.clone());
    }
}
