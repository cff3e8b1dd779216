// ABOUTME: Lint tasks for scripts and markup
// ABOUTME: Runs the configured external lint command over the matched source files

use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::LintToolConfig;
use crate::pipeline::fileset::collect_files;
use crate::runner::{ActionOutput, BuildContext, Result, RunnerError, TaskAction};

#[derive(Debug, Clone, Copy)]
enum LintKind {
    Scripts,
    Markup,
}

pub struct LintTask {
    kind: LintKind,
}

impl LintTask {
    /// Lint JavaScript sources, excluding test specs.
    pub fn scripts() -> Self {
        Self {
            kind: LintKind::Scripts,
        }
    }

    /// Lint HTML templates.
    pub fn markup() -> Self {
        Self {
            kind: LintKind::Markup,
        }
    }

    fn tool<'a>(&self, ctx: &'a BuildContext) -> &'a LintToolConfig {
        match self.kind {
            LintKind::Scripts => &ctx.config.lint.scripts,
            LintKind::Markup => &ctx.config.lint.markup,
        }
    }

    fn files(&self, ctx: &BuildContext) -> Result<Vec<std::path::PathBuf>> {
        let paths = ctx.paths();
        match self.kind {
            LintKind::Scripts => collect_files(
                &paths.app_dir(),
                &paths.script_globs,
                &paths.script_excludes,
            ),
            LintKind::Markup => {
                // Templates plus the index page itself.
                let mut includes = paths.template_globs.clone();
                includes.push(paths.index_page.clone());
                collect_files(&paths.app_dir(), &includes, &[])
            }
        }
    }

    fn tool_name(&self, ctx: &BuildContext) -> String {
        self.tool(ctx)
            .command
            .first()
            .cloned()
            .unwrap_or_else(|| "lint".to_string())
    }
}

#[async_trait]
impl TaskAction for LintTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let files = self.files(&ctx)?;
        let tool = self.tool(&ctx);
        let tool_name = self.tool_name(&ctx);

        if files.is_empty() {
            debug!("No files matched for {}", tool_name);
            return Ok(ActionOutput::with_message(format!(
                "{}: no files to lint",
                tool_name
            )));
        }

        let program = tool
            .command
            .first()
            .ok_or_else(|| RunnerError::action("Lint command is empty"))?;

        let mut cmd = Command::new(program);
        cmd.args(&tool.command[1..]);
        if tool.pass_files {
            cmd.args(&files);
        }
        cmd.kill_on_drop(true);

        info!("Linting {} files with {}", files.len(), tool_name);

        let output = cmd.output().await.map_err(|e| {
            RunnerError::action(format!("Failed to start '{}': {}", program, e))
        })?;

        if output.status.success() {
            Ok(ActionOutput::with_message(format!(
                "{}: {} files clean",
                tool_name,
                files.len()
            )))
        } else {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut details = String::new();
            if !stdout.trim().is_empty() {
                details.push_str(stdout.trim());
            }
            if !stderr.trim().is_empty() {
                if !details.is_empty() {
                    details.push('\n');
                }
                details.push_str(stderr.trim());
            }
            if details.is_empty() {
                details = format!("exited with {}", output.status);
            }
            Err(RunnerError::LintViolation {
                tool: tool_name,
                details,
            })
        }
    }
}
