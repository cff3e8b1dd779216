// ABOUTME: Command implementations for the pipewright CLI
// ABOUTME: Handles execution of the run and list commands

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::pipeline::register_pipeline;
use crate::runner::{BuildContext, RunStatus, TaskRunner, TaskSet, TaskStatus};

/// Run pipeline tasks and report the outcome.
pub async fn run_tasks(
    targets: Vec<String>,
    output: Option<PathBuf>,
    config: Config,
) -> Result<()> {
    let mut tasks = TaskSet::new();
    register_pipeline(&mut tasks)?;

    let max_concurrent = config.max_concurrent;
    let context = Arc::new(BuildContext::new(config));

    info!("Running tasks: {}", targets.join(", "));

    let runner = TaskRunner::new(max_concurrent);
    let run_result = runner.run(&tasks, &targets, context).await?;

    if let Some(output_path) = output {
        let json_content = serde_json::to_string_pretty(&run_result)
            .map_err(|e| anyhow::anyhow!("Failed to serialize results to JSON: {}", e))?;
        std::fs::write(&output_path, json_content).map_err(|e| {
            anyhow::anyhow!(
                "Failed to write output file '{}': {}",
                output_path.display(),
                e
            )
        })?;
        info!("Results written to: {}", output_path.display());
    } else {
        println!(
            "Run '{}' completed with status: {}",
            run_result.targets.join(", "),
            run_result.status
        );
        for task_result in &run_result.tasks {
            let marker = match task_result.status {
                TaskStatus::Success => "✓",
                TaskStatus::Failed => "✗",
                TaskStatus::Skipped => "-",
                _ => "?",
            };
            println!("  {} {}: {}", marker, task_result.task_name, task_result.status);
            if let Some(ref message) = task_result.message {
                println!("      {}", message.trim());
            }
            if let Some(ref error) = task_result.error {
                println!("      {}", error.trim());
            }
        }
    }

    // Return error if the run failed to ensure proper exit code
    match run_result.status {
        RunStatus::Success => Ok(()),
        _ => Err(anyhow::anyhow!(
            "Run failed: {}",
            run_result
                .error
                .unwrap_or_else(|| "task failure".to_string())
        )),
    }
}

/// Print the registered tasks with their prerequisites.
pub fn list_tasks() -> Result<()> {
    let mut tasks = TaskSet::new();
    register_pipeline(&mut tasks)?;

    println!("Available tasks:");
    for task in tasks.iter() {
        let prerequisites = if task.prerequisites.is_empty() {
            String::new()
        } else {
            format!(" (after: {})", task.prerequisites.join(", "))
        };
        let description = task.description.as_deref().unwrap_or("");
        println!("  {:<12} {}{}", task.name, description, prerequisites);
    }
    Ok(())
}
