// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Builds throwaway front-end project trees and matching configurations

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use pipewright::config::{Config, LintToolConfig, Paths};
use pipewright::runner::BuildContext;

/// A scratch project with the source layout the pipeline expects.
pub struct TestProject {
    pub dir: TempDir,
    pub config: Config,
}

impl TestProject {
    /// Creates a populated project: scripts, styles, templates, images,
    /// fonts, extras, and a manifest. Lint commands are stubbed to succeed.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().to_path_buf();

        write(&root.join("src/app/main.js"), "var app = {};\n");
        write(&root.join("src/app/util.js"), "var util = {};\n");
        write(&root.join("src/app/util.spec.js"), "describe('util');\n");
        write(
            &root.join("src/app/widget.html"),
            "<div class=\"widget\"></div>\n",
        );
        write(
            &root.join("src/styles/main.css"),
            "body {\n  margin: 0;\n}\n",
        );
        write(
            &root.join("src/index.html"),
            "<html>\n  <head>\n    <link href=\"styles/main.css\">\n  </head>\n  <body>\n    <script src=\"scripts/build.js\"></script>\n  </body>\n</html>\n",
        );
        write_bytes(&root.join("src/images/logo.png"), b"\x89PNG png-bytes");
        write_bytes(
            &root.join("src/images/icons/arrow.gif"),
            b"GIF89a gif-bytes",
        );
        write_bytes(&root.join("src/fonts/brand.woff"), b"woff-bytes");
        write_bytes(
            &root.join("src/vendor/bootstrap/fonts/glyphs.ttf"),
            b"ttf-bytes",
        );
        write_bytes(&root.join("src/favicon.ico"), b"ico-bytes");
        write(&root.join("src/robots.txt"), "User-agent: *\n");
        write(
            &root.join("project.json"),
            r#"{
  "name": "demo-app",
  "description": "Demo front-end application",
  "version": "1.2.3",
  "author": {
    "name": "Test Author",
    "email": "test@example.com"
  }
}
"#,
        );

        let mut config = Config::default();
        config.paths = Paths::rooted_at(&root);
        config.lint.scripts = passing_linter();
        config.lint.markup = passing_linter();

        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn context(&self) -> Arc<BuildContext> {
        Arc::new(BuildContext::new(self.config.clone()))
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.config.paths.dist_dir()
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.config.paths.manifest_file()
    }

    /// Replace a lint tool with a command that fails and prints a violation.
    pub fn with_failing_script_linter(mut self, message: &str) -> Self {
        self.config.lint.scripts = LintToolConfig {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("echo '{}'; exit 1", message),
            ],
            pass_files: false,
        };
        self
    }
}

/// A lint tool that always exits cleanly.
pub fn passing_linter() -> LintToolConfig {
    LintToolConfig {
        command: vec!["true".to_string()],
        pass_files: false,
    }
}

fn write(path: &Path, contents: &str) {
    write_bytes(path, contents.as_bytes());
}

fn write_bytes(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, contents).expect("Failed to write test file");
}
