// ABOUTME: The concrete build pipeline tasks and their wiring
// ABOUTME: Registers the full task table with prerequisites and descriptions

pub mod assets;
pub mod bump;
pub mod clean;
pub mod compile;
pub mod fileset;
pub mod lint;
pub mod serve;
pub mod watch;

use crate::runner::{NoopAction, Result, TaskSet};

use assets::{ExtrasTask, FontsTask, ImagesTask};
use bump::BumpTask;
use clean::CleanTask;
use compile::CompileTask;
use lint::LintTask;
use serve::ServeTask;
use watch::WatchTask;

/// Register the full pipeline. The `build` and `default` tasks exist only to
/// aggregate their prerequisites.
pub fn register_pipeline(tasks: &mut TaskSet) -> Result<()> {
    tasks.register(
        "clean",
        &[],
        Some("Remove build output and scratch directories"),
        CleanTask,
    )?;
    tasks.register(
        "jshint",
        &[],
        Some("Lint JavaScript sources"),
        LintTask::scripts(),
    )?;
    tasks.register(
        "htmlhint",
        &[],
        Some("Lint HTML templates"),
        LintTask::markup(),
    )?;
    tasks.register(
        "images",
        &["clean"],
        Some("Copy images into the distribution"),
        ImagesTask,
    )?;
    tasks.register(
        "fonts",
        &["clean"],
        Some("Collect fonts into the distribution"),
        FontsTask,
    )?;
    tasks.register(
        "extras",
        &["clean"],
        Some("Copy top-level extras into the distribution"),
        ExtrasTask,
    )?;
    tasks.register(
        "compile",
        &["clean", "jshint", "htmlhint"],
        Some("Bundle, fingerprint, and emit scripts, styles, and the index page"),
        CompileTask,
    )?;
    tasks.register(
        "build",
        &["clean", "compile", "extras", "images", "fonts"],
        Some("Produce the complete distribution"),
        NoopAction,
    )?;
    tasks.register(
        "watch",
        &[],
        Some("Watch sources and re-lint on change"),
        WatchTask,
    )?;
    tasks.register(
        "serve",
        &["watch"],
        Some("Serve sources for development"),
        ServeTask::dev(),
    )?;
    tasks.register(
        "serve:dist",
        &["build"],
        Some("Serve the built distribution"),
        ServeTask::dist(),
    )?;
    tasks.register(
        "bump",
        &["jshint", "htmlhint"],
        Some("Bump the project manifest version"),
        BumpTask,
    )?;
    tasks.register(
        "default",
        &["serve"],
        Some("Lint, watch, and serve for development"),
        NoopAction,
    )?;
    Ok(())
}
