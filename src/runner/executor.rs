// ABOUTME: Task runner that drives batched execution of a task set
// ABOUTME: Runs each batch concurrently under a semaphore and aborts remaining batches on failure

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use super::context::BuildContext;
use super::error::Result;
use super::graph::DependencyGraph;
use super::result::{RunResult, TaskResult, TaskStatus};
use super::task::{Task, TaskSet};

pub struct TaskRunner {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
}

impl TaskRunner {
    /// Create a runner with the given concurrency limit.
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Run the requested targets and their prerequisites.
    ///
    /// Batches execute sequentially. When a task in a batch fails, tasks in
    /// the same batch that already started run to completion, and every task
    /// in later batches is recorded as skipped.
    pub async fn run(
        &self,
        tasks: &TaskSet,
        targets: &[String],
        context: Arc<BuildContext>,
    ) -> Result<RunResult> {
        let graph = DependencyGraph::for_targets(tasks, targets)?;
        let plan = graph.create_execution_plan()?;

        info!(
            "Starting run {} for targets: {}",
            context.run_id,
            targets.join(", ")
        );
        debug!(
            "Execution plan: {} tasks in {} batches (max parallelism {})",
            plan.total_tasks,
            plan.execution_depth(),
            plan.max_parallelism()
        );

        let mut run_result = RunResult::new(targets.to_vec(), context.run_id.clone());
        let mut aborted = false;

        for (batch_index, batch) in plan.batches.iter().enumerate() {
            if aborted {
                for task_name in batch {
                    warn!("Skipping task {} (earlier task failed)", task_name);
                    run_result.record_task_result(TaskResult::skipped(
                        task_name.clone(),
                        "prerequisite failed",
                    ));
                }
                continue;
            }

            debug!(
                "Executing batch {}/{}: {}",
                batch_index + 1,
                plan.execution_depth(),
                batch.join(", ")
            );

            let batch_tasks: Vec<Task> = batch
                .iter()
                .filter_map(|name| tasks.get(name).cloned())
                .collect();

            let results = self.execute_batch(batch_tasks, Arc::clone(&context)).await;

            for result in results {
                if result.is_failed() {
                    aborted = true;
                }
                run_result.record_task_result(result);
            }
        }

        run_result.mark_completed();

        info!(
            "Run {} completed: {} succeeded, {} failed, {} skipped",
            context.run_id,
            run_result.summary.successful_tasks,
            run_result.summary.failed_tasks,
            run_result.summary.skipped_tasks
        );

        Ok(run_result)
    }

    /// Execute one batch with bounded concurrency. Tasks are spawned together
    /// and joined as a group, so a failing sibling never interrupts the others.
    async fn execute_batch(&self, batch: Vec<Task>, context: Arc<BuildContext>) -> Vec<TaskResult> {
        if batch.is_empty() {
            return Vec::new();
        }

        let futures = batch.into_iter().map(|task| {
            let permit = Arc::clone(&self.semaphore);
            let context = Arc::clone(&context);

            tokio::spawn(async move {
                let _permit = permit.acquire().await.expect("Semaphore closed");
                execute_single(task, context).await
            })
        });

        let joined = join_all(futures).await;

        let mut results = Vec::new();
        for (i, joined_result) in joined.into_iter().enumerate() {
            match joined_result {
                Ok(task_result) => results.push(task_result),
                Err(join_error) => {
                    error!("Task join error: {}", join_error);
                    let mut result = TaskResult::new(format!("unknown_task_{}", i));
                    result.mark_completed(
                        TaskStatus::Failed,
                        None,
                        Some(format!("Join error: {}", join_error)),
                    );
                    results.push(result);
                }
            }
        }

        results
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

async fn execute_single(task: Task, context: Arc<BuildContext>) -> TaskResult {
    let mut result = TaskResult::new(task.name.clone());
    result.mark_started();

    info!("Running task: {}", task.name);

    match task.action.run(context).await {
        Ok(output) => {
            result.metadata = output.metadata;
            result.mark_completed(TaskStatus::Success, output.message, None);
            info!(
                "Task {} finished in {:?}",
                task.name,
                result.duration.unwrap_or_default()
            );
        }
        Err(err) => {
            error!("Task {} failed: {}", task.name, err);
            result.mark_completed(TaskStatus::Failed, None, Some(err.to_string()));
        }
    }

    result
}
