// ABOUTME: Error types for task graph construction and execution
// ABOUTME: Defines the fatal graph errors and per-action failure kinds

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Unknown task: {name}")]
    UnknownTask { name: String },

    #[error("Task already registered: {name}")]
    DuplicateTask { name: String },

    #[error("Cyclic dependency detected involving task: {tasks:?}")]
    CyclicDependency { tasks: Vec<String> },

    #[error("Lint violations reported by '{tool}':\n{details}")]
    LintViolation { tool: String, details: String },

    #[error("Task action failed: {message}")]
    ActionFailure { message: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("Manifest error: {0}")]
    ManifestError(#[from] crate::manifest::ManifestError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl RunnerError {
    pub fn action(message: impl Into<String>) -> Self {
        Self::ActionFailure {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
