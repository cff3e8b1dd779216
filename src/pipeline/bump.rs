// ABOUTME: Version bump task
// ABOUTME: Raises the project manifest version at the requested level

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::ConfigError;
use crate::manifest::ProjectManifest;
use crate::runner::{ActionOutput, BuildContext, Result, TaskAction};

pub struct BumpTask;

#[async_trait]
impl TaskAction for BumpTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let level = ctx
            .config
            .bump_level
            .ok_or(ConfigError::MissingArgument {
                name: "type",
                usage: "--type=(major|minor|patch)",
            })?;

        let manifest_path = ctx.paths().manifest_file();
        let mut manifest = ProjectManifest::load(&manifest_path)?;
        let old_version = manifest.parsed_version()?;
        let new_version = manifest.bump(level)?;
        manifest.save(&manifest_path)?;

        info!("Bumped version: {} -> {}", old_version, new_version);

        let mut output = ActionOutput::with_message(format!(
            "Bumped version: {} -> {}",
            old_version, new_version
        ));
        output.add_metadata("old_version", old_version.to_string());
        output.add_metadata("new_version", new_version.to_string());
        Ok(output)
    }
}
