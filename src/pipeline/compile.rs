// ABOUTME: Compile task producing the distributable bundle
// ABOUTME: Concatenates scripts and styles, fingerprints them, and rewrites the index page

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::manifest::ProjectManifest;
use crate::pipeline::fileset::collect_files;
use crate::runner::{ActionOutput, BuildContext, Result, RunnerError, TaskAction};

pub struct CompileTask;

#[async_trait]
impl TaskAction for CompileTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let paths = ctx.paths();
        let manifest = ProjectManifest::load(&paths.manifest_file())?;
        let banner = manifest.banner();

        let script_bundle = concat_sources(
            &paths.app_dir(),
            &paths.script_globs,
            &paths.script_excludes,
        )?;
        if script_bundle.is_empty() {
            return Err(RunnerError::action("No script sources matched"));
        }

        // Unfingerprinted copy for the dev server.
        let tmp_bundle = paths.tmp_scripts_dir().join("build.js");
        write_file(&tmp_bundle, &script_bundle).await?;

        let style_bundle = minify_css(&concat_sources(
            &paths.app_dir(),
            &paths.style_globs,
            &[],
        )?);

        let script_rev = fingerprint(&script_bundle);
        let style_rev = fingerprint(&style_bundle);

        let script_name = format!("build-{}.js", script_rev);
        let style_name = format!("main-{}.css", style_rev);

        write_file(
            &paths.dist_scripts_dir().join(&script_name),
            &format!("{}{}", banner, script_bundle),
        )
        .await?;
        write_file(
            &paths.dist_styles_dir().join(&style_name),
            &format!("{}{}", banner, style_bundle),
        )
        .await?;

        let index = tokio::fs::read_to_string(paths.index_file()).await?;
        let rewritten = rewrite_index(&index, &ctx, &script_name, &style_name);
        let index_out = paths.dist_dir().join(&paths.index_page);
        write_file(&index_out, &minify_html(&rewritten)).await?;

        info!(
            "Compiled {} and {} for {}",
            script_name, style_name, ctx.config.environment
        );

        let mut output = ActionOutput::with_message(format!(
            "v{} compiled ({} env)",
            manifest.version, ctx.config.environment
        ));
        output.add_metadata("script", script_name);
        output.add_metadata("style", style_name);
        output.add_metadata("index", index_out.display().to_string());
        output.add_metadata("app_url", ctx.config.app_base_url());
        Ok(output)
    }
}

/// Concatenate matched sources in sorted path order.
fn concat_sources(base: &Path, includes: &[String], excludes: &[String]) -> Result<String> {
    let files = collect_files(base, includes, excludes)?;
    let mut combined = String::new();
    for file in &files {
        debug!("Bundling {}", file.display());
        combined.push_str(&std::fs::read_to_string(file)?);
        if !combined.ends_with('\n') {
            combined.push('\n');
        }
    }
    Ok(combined)
}

async fn write_file(path: &PathBuf, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

/// First 8 hex digits of the content hash, used as the cache-busting revision.
fn fingerprint(contents: &str) -> String {
    let digest = Sha256::digest(contents.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..8].to_string()
}

/// Point the index page at the fingerprinted bundles, prefixed with the CDN
/// base when CDN delivery is enabled.
fn rewrite_index(
    index: &str,
    ctx: &BuildContext,
    script_name: &str,
    style_name: &str,
) -> String {
    let base = ctx.config.asset_base_url();
    index
        .replace(
            "scripts/build.js",
            &format!("{}scripts/{}", base, script_name),
        )
        .replace(
            "styles/main.css",
            &format!("{}styles/{}", base, style_name),
        )
}

/// Strip comments and collapse runs of whitespace.
fn minify_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    break;
                }
            }
        } else if c.is_whitespace() {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

/// Drop inter-tag whitespace so the emitted page is one compact line per tag run.
fn minify_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    for line in html.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out
}
