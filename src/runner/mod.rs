// ABOUTME: Core task graph runner
// ABOUTME: Task registration, dependency resolution, batched concurrent execution

pub mod context;
pub mod error;
pub mod executor;
pub mod graph;
pub mod result;
pub mod task;

pub use context::BuildContext;
pub use error::{Result, RunnerError};
pub use executor::TaskRunner;
pub use graph::{DependencyGraph, ExecutionPlan};
pub use result::{RunResult, RunStatus, RunSummary, TaskResult, TaskStatus};
pub use task::{ActionOutput, FnAction, NoopAction, Task, TaskAction, TaskSet};
