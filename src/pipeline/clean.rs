// ABOUTME: Clean task removing build output and scratch directories
// ABOUTME: Deletes the build and tmp trees, tolerating their absence

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::runner::{ActionOutput, BuildContext, Result, TaskAction};

pub struct CleanTask;

#[async_trait]
impl TaskAction for CleanTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let paths = ctx.paths();
        let mut removed = Vec::new();

        for dir in [paths.build_dir(), paths.tmp_dir()] {
            if remove_dir_if_present(&dir).await? {
                debug!("Removed {}", dir.display());
                removed.push(dir.display().to_string());
            }
        }

        let message = if removed.is_empty() {
            "Nothing to clean".to_string()
        } else {
            format!("Removed {}", removed.join(", "))
        };
        Ok(ActionOutput::with_message(message))
    }
}

async fn remove_dir_if_present(dir: &Path) -> Result<bool> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
