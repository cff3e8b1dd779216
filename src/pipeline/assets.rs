// ABOUTME: Static asset tasks: images, fonts, and top-level extras
// ABOUTME: Copies matched assets into the dist layout

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::pipeline::fileset::{copy_flat, copy_tree, format_size};
use crate::runner::{ActionOutput, BuildContext, Result, TaskAction};

/// Copies images into dist, preserving their directory structure.
pub struct ImagesTask;

#[async_trait]
impl TaskAction for ImagesTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let paths = ctx.paths();
        let (count, bytes) = copy_tree(
            &paths.images_dir(),
            &paths.image_globs,
            &[],
            &paths.dist_images_dir(),
        )
        .await?;

        info!("Copied {} images ({})", count, format_size(bytes));
        let mut output =
            ActionOutput::with_message(format!("{} images ({})", count, format_size(bytes)));
        output.add_metadata("files", count.to_string());
        output.add_metadata("bytes", bytes.to_string());
        Ok(output)
    }
}

/// Collects fonts from the project and vendor trees into a flat dist/fonts.
pub struct FontsTask;

#[async_trait]
impl TaskAction for FontsTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let paths = ctx.paths();
        let mut count = 0;
        let mut bytes = 0;

        for source in paths.font_dirs() {
            let (n, b) = copy_flat(
                &source,
                &paths.font_globs,
                &[],
                &paths.dist_fonts_dir(),
            )
            .await?;
            count += n;
            bytes += b;
        }

        info!("Copied {} fonts ({})", count, format_size(bytes));
        let mut output =
            ActionOutput::with_message(format!("{} fonts ({})", count, format_size(bytes)));
        output.add_metadata("files", count.to_string());
        Ok(output)
    }
}

/// Copies loose top-level files (favicons, robots.txt and friends) into dist.
pub struct ExtrasTask;

#[async_trait]
impl TaskAction for ExtrasTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let paths = ctx.paths();
        let (count, bytes) = copy_tree(
            &paths.app_dir(),
            &paths.extra_globs,
            &[],
            &paths.dist_dir(),
        )
        .await?;

        info!("Copied {} extras ({})", count, format_size(bytes));
        Ok(ActionOutput::with_message(format!(
            "{} extra files ({})",
            count,
            format_size(bytes)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Paths};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn context_rooted_at(dir: &Path) -> Arc<BuildContext> {
        let mut config = Config::default();
        config.paths = Paths::rooted_at(dir);
        Arc::new(BuildContext::new(config))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"asset").unwrap();
    }

    #[tokio::test]
    async fn test_images_copy_preserves_structure() {
        let dir = TempDir::new().unwrap();
        let ctx = context_rooted_at(dir.path());
        touch(&ctx.paths().images_dir().join("logo.png"));
        touch(&ctx.paths().images_dir().join("icons/arrow.gif"));

        ImagesTask.run(Arc::clone(&ctx)).await.unwrap();

        assert!(ctx.paths().dist_images_dir().join("logo.png").exists());
        assert!(ctx
            .paths()
            .dist_images_dir()
            .join("icons/arrow.gif")
            .exists());
    }

    #[tokio::test]
    async fn test_fonts_flattened_from_all_sources() {
        let dir = TempDir::new().unwrap();
        let ctx = context_rooted_at(dir.path());
        touch(&ctx.paths().app_dir().join("fonts/brand.woff"));
        touch(&ctx.paths().app_dir().join("vendor/bootstrap/fonts/icons.ttf"));

        FontsTask.run(Arc::clone(&ctx)).await.unwrap();

        assert!(ctx.paths().dist_fonts_dir().join("brand.woff").exists());
        assert!(ctx.paths().dist_fonts_dir().join("icons.ttf").exists());
    }

    #[tokio::test]
    async fn test_extras_copies_top_level_files_only() {
        let dir = TempDir::new().unwrap();
        let ctx = context_rooted_at(dir.path());
        touch(&ctx.paths().app_dir().join("favicon.ico"));
        touch(&ctx.paths().app_dir().join("robots.txt"));
        touch(&ctx.paths().app_dir().join("app/nested.txt"));

        ExtrasTask.run(Arc::clone(&ctx)).await.unwrap();

        assert!(ctx.paths().dist_dir().join("favicon.ico").exists());
        assert!(ctx.paths().dist_dir().join("robots.txt").exists());
        assert!(!ctx.paths().dist_dir().join("app/nested.txt").exists());
    }
}
