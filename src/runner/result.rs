// ABOUTME: Task and run result types with status aggregation
// ABOUTME: Tracks per-task outcomes and summarizes a complete run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_name: String,
    pub status: TaskStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub targets: Vec<String>,
    pub run_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub status: RunStatus,
    pub tasks: Vec<TaskResult>,
    pub summary: RunSummary,
    /// First error reported by a failing task; the run's terminal outcome.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunSummary {
    pub total_tasks: usize,
    pub successful_tasks: usize,
    pub failed_tasks: usize,
    pub skipped_tasks: usize,
}

impl TaskResult {
    pub fn new(task_name: String) -> Self {
        Self {
            task_name,
            status: TaskStatus::Pending,
            start_time: Utc::now(),
            end_time: None,
            duration: None,
            message: None,
            error: None,
            metadata: HashMap::new(),
        }
    }

    pub fn skipped(task_name: String, reason: &str) -> Self {
        let mut result = Self::new(task_name);
        result.mark_completed(TaskStatus::Skipped, None, Some(reason.to_string()));
        result
    }

    pub fn mark_started(&mut self) {
        self.status = TaskStatus::Running;
        self.start_time = Utc::now();
    }

    pub fn mark_completed(
        &mut self,
        status: TaskStatus,
        message: Option<String>,
        error: Option<String>,
    ) {
        self.status = status;
        self.end_time = Some(Utc::now());
        self.duration = Some(
            (Utc::now() - self.start_time)
                .to_std()
                .unwrap_or(Duration::ZERO),
        );
        self.message = message;
        self.error = error;
    }

    pub fn is_successful(&self) -> bool {
        self.status == TaskStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.status, TaskStatus::Pending | TaskStatus::Running)
    }
}

impl RunResult {
    pub fn new(targets: Vec<String>, run_id: String) -> Self {
        Self {
            targets,
            run_id,
            start_time: Utc::now(),
            end_time: None,
            duration: None,
            status: RunStatus::Running,
            tasks: Vec::new(),
            summary: RunSummary::default(),
            error: None,
        }
    }

    pub fn record_task_result(&mut self, result: TaskResult) {
        // Keep the first reported error as the run's terminal error.
        if result.is_failed() && self.error.is_none() {
            self.error = result.error.clone();
        }
        if let Some(existing) = self
            .tasks
            .iter_mut()
            .find(|t| t.task_name == result.task_name)
        {
            *existing = result;
        } else {
            self.tasks.push(result);
        }
        self.update_summary();
    }

    pub fn mark_completed(&mut self) {
        self.end_time = Some(Utc::now());
        self.duration = Some(
            (Utc::now() - self.start_time)
                .to_std()
                .unwrap_or(Duration::ZERO),
        );
        self.status = if self.has_failures() {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };
        self.update_summary();
    }

    pub fn get_task_result(&self, task_name: &str) -> Option<&TaskResult> {
        self.tasks.iter().find(|t| t.task_name == task_name)
    }

    pub fn has_failures(&self) -> bool {
        self.tasks.iter().any(|t| t.is_failed())
    }

    fn update_summary(&mut self) {
        self.summary = RunSummary {
            total_tasks: self.tasks.len(),
            successful_tasks: self.tasks.iter().filter(|t| t.is_successful()).count(),
            failed_tasks: self.tasks.iter().filter(|t| t.is_failed()).count(),
            skipped_tasks: self
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Skipped)
                .count(),
        };
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Skipped => write!(f, "skipped"),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Success => write!(f, "success"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}
