// ABOUTME: Main library module for the pipewright build pipeline
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod runner;

// Re-export commonly used types
pub use cli::{App, Args, Commands};
pub use config::{Browser, BumpLevel, Config, Environment, Paths};
pub use manifest::{ProjectManifest, Version};
pub use runner::{
    BuildContext, RunResult, RunStatus, RunnerError, TaskRunner, TaskSet, TaskStatus,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
