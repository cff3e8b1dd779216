// ABOUTME: Build configuration for the pipewright pipeline
// ABOUTME: Handles selector parsing, path layout, and config file/environment merging

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value '{value}' for '{name}' (expected one of: {allowed})")]
    InvalidArgument {
        name: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("required argument '{name}' is missing ({usage})")]
    MissingArgument {
        name: &'static str,
        usage: &'static str,
    },

    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Target environment for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    #[default]
    Dev,
    Test,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "prod" => Ok(Environment::Prod),
            "dev" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            _ => Err(ConfigError::InvalidArgument {
                name: "env",
                value: s.to_string(),
                allowed: "prod|dev|test",
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Prod => write!(f, "prod"),
            Environment::Dev => write!(f, "dev"),
            Environment::Test => write!(f, "test"),
        }
    }
}

/// Browser selector used by test-oriented runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Browser {
    #[default]
    #[serde(rename = "PhantomJS")]
    PhantomJs,
    Chrome,
    Firefox,
    Safari,
}

impl FromStr for Browser {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "phantomjs" => Ok(Browser::PhantomJs),
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "safari" => Ok(Browser::Safari),
            _ => Err(ConfigError::InvalidArgument {
                name: "browsers",
                value: s.to_string(),
                allowed: "PhantomJS|Chrome|Firefox|Safari",
            }),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Browser::PhantomJs => write!(f, "PhantomJS"),
            Browser::Chrome => write!(f, "Chrome"),
            Browser::Firefox => write!(f, "Firefox"),
            Browser::Safari => write!(f, "Safari"),
        }
    }
}

/// Which semantic version field the bump task increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

impl FromStr for BumpLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(BumpLevel::Major),
            "minor" => Ok(BumpLevel::Minor),
            "patch" => Ok(BumpLevel::Patch),
            _ => Err(ConfigError::InvalidArgument {
                name: "type",
                value: s.to_string(),
                allowed: "major|minor|patch",
            }),
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpLevel::Major => write!(f, "major"),
            BumpLevel::Minor => write!(f, "minor"),
            BumpLevel::Patch => write!(f, "patch"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub browsers: Browser,

    /// Rewrite emitted asset URLs against the CDN base.
    #[serde(default)]
    pub cdn: bool,

    /// Version bump level for the bump task. Only settable via CLI/env.
    #[serde(skip)]
    pub bump_level: Option<BumpLevel>,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default)]
    pub urls: UrlConfig,

    #[serde(default)]
    pub lint: LintConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub paths: Paths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    pub production: String,
    pub development: String,
    pub cdn_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    #[serde(default = "default_script_linter")]
    pub scripts: LintToolConfig,

    #[serde(default = "default_markup_linter")]
    pub markup: LintToolConfig,
}

/// An external lint tool invoked as a subprocess. The matched source files
/// are appended to the command line when `pass_files` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintToolConfig {
    pub command: Vec<String>,
    #[serde(default = "default_true")]
    pub pass_files: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Source, scratch, and output directory layout. All paths are resolved
/// relative to `root`, which defaults to the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_app")]
    pub app: PathBuf,

    #[serde(default = "default_tmp")]
    pub tmp: PathBuf,

    #[serde(default = "default_build")]
    pub build: PathBuf,

    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_index_page")]
    pub index_page: String,

    #[serde(default = "default_script_globs")]
    pub script_globs: Vec<String>,

    #[serde(default = "default_script_excludes")]
    pub script_excludes: Vec<String>,

    #[serde(default = "default_style_globs")]
    pub style_globs: Vec<String>,

    #[serde(default = "default_template_globs")]
    pub template_globs: Vec<String>,

    #[serde(default = "default_image_globs")]
    pub image_globs: Vec<String>,

    #[serde(default = "default_font_globs")]
    pub font_globs: Vec<String>,

    #[serde(default = "default_extra_globs")]
    pub extra_globs: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    4
}

fn default_script_linter() -> LintToolConfig {
    LintToolConfig {
        command: vec!["jshint".to_string()],
        pass_files: true,
    }
}

fn default_markup_linter() -> LintToolConfig {
    LintToolConfig {
        command: vec!["htmlhint".to_string()],
        pass_files: true,
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_app() -> PathBuf {
    PathBuf::from("src")
}

fn default_tmp() -> PathBuf {
    PathBuf::from(".tmp")
}

fn default_build() -> PathBuf {
    PathBuf::from("build")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("project.json")
}

fn default_index_page() -> String {
    "index.html".to_string()
}

fn default_script_globs() -> Vec<String> {
    vec!["app/**/*.js".to_string()]
}

fn default_script_excludes() -> Vec<String> {
    vec!["**/*.spec.js".to_string()]
}

fn default_style_globs() -> Vec<String> {
    vec!["styles/**/*.css".to_string()]
}

fn default_template_globs() -> Vec<String> {
    vec!["app/**/*.html".to_string()]
}

fn default_image_globs() -> Vec<String> {
    vec!["**/*.{png,gif,jpg,jpeg}".to_string()]
}

fn default_font_globs() -> Vec<String> {
    vec!["**/*.{eot,svg,ttf,woff}".to_string()]
}

fn default_extra_globs() -> Vec<String> {
    vec!["*.{ico,png,txt}".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            browsers: Browser::default(),
            cdn: false,
            bump_level: None,
            max_concurrent: default_max_concurrent(),
            urls: UrlConfig::default(),
            lint: LintConfig {
                scripts: default_script_linter(),
                markup: default_markup_linter(),
            },
            serve: ServeConfig::default(),
            logging: LoggingConfig::default(),
            paths: Paths::default(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            production: "https://app.example.com".to_string(),
            development: "http://127.0.0.1:3000".to_string(),
            cdn_base: "https://cdn.example.com/dist/".to_string(),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            scripts: default_script_linter(),
            markup: default_markup_linter(),
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            root: default_root(),
            app: default_app(),
            tmp: default_tmp(),
            build: default_build(),
            manifest: default_manifest(),
            index_page: default_index_page(),
            script_globs: default_script_globs(),
            script_excludes: default_script_excludes(),
            style_globs: default_style_globs(),
            template_globs: default_template_globs(),
            image_globs: default_image_globs(),
            font_globs: default_font_globs(),
            extra_globs: default_extra_globs(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    /// Find configuration file in standard locations.
    fn find_config_file() -> PathBuf {
        let possible_paths = [
            PathBuf::from("pipewright.yaml"),
            PathBuf::from("pipewright.yml"),
            PathBuf::from(".pipewright.yaml"),
            PathBuf::from(".pipewright.yml"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".pipewright").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        for path in possible_paths {
            if path.exists() {
                return path;
            }
        }

        PathBuf::from("pipewright.yaml")
    }

    /// Merge environment variables into configuration. Selector values are
    /// validated the same way CLI values are.
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(env) = std::env::var("PIPEWRIGHT_ENV") {
            self.environment = env.parse()?;
        }
        if let Ok(browsers) = std::env::var("PIPEWRIGHT_BROWSERS") {
            self.browsers = browsers.parse()?;
        }
        if let Ok(cdn) = std::env::var("PIPEWRIGHT_CDN") {
            self.cdn = matches!(cdn.as_str(), "1" | "true" | "yes");
        }
        if let Ok(level) = std::env::var("PIPEWRIGHT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PIPEWRIGHT_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(max) = std::env::var("PIPEWRIGHT_MAX_CONCURRENT") {
            self.max_concurrent = max.parse().map_err(|_| ConfigError::InvalidArgument {
                name: "max_concurrent",
                value: max,
                allowed: "a positive integer",
            })?;
        }

        Ok(())
    }

    /// Prefix emitted asset references are rewritten against. Empty when CDN
    /// delivery is off, so references stay relative to the served page.
    pub fn asset_base_url(&self) -> &str {
        if self.cdn {
            &self.urls.cdn_base
        } else {
            ""
        }
    }

    /// Base URL the application itself is reached at.
    pub fn app_base_url(&self) -> &str {
        match self.environment {
            Environment::Prod => &self.urls.production,
            _ => &self.urls.development,
        }
    }
}

impl Paths {
    /// Path layout rooted at an explicit project directory.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn app_dir(&self) -> PathBuf {
        self.root.join(&self.app)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join(&self.tmp)
    }

    pub fn tmp_scripts_dir(&self) -> PathBuf {
        self.tmp_dir().join("scripts")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.build)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.build_dir().join("dist")
    }

    pub fn dist_scripts_dir(&self) -> PathBuf {
        self.dist_dir().join("scripts")
    }

    pub fn dist_styles_dir(&self) -> PathBuf {
        self.dist_dir().join("styles")
    }

    pub fn dist_images_dir(&self) -> PathBuf {
        self.dist_dir().join("images")
    }

    pub fn dist_fonts_dir(&self) -> PathBuf {
        self.dist_dir().join("fonts")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.app_dir().join("images")
    }

    /// Font sources: the project's own fonts plus vendored ones.
    pub fn font_dirs(&self) -> Vec<PathBuf> {
        vec![self.app_dir().join("fonts"), self.app_dir().join("vendor")]
    }

    pub fn index_file(&self) -> PathBuf {
        self.app_dir().join(&self.index_page)
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_selector_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!("Dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);

        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("staging"));
        assert!(err.to_string().contains("prod|dev|test"));
    }

    #[test]
    fn test_browser_selector_parsing() {
        assert_eq!("PhantomJS".parse::<Browser>().unwrap(), Browser::PhantomJs);
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chrome);
        assert!("netscape".parse::<Browser>().is_err());
    }

    #[test]
    fn test_bump_level_parsing() {
        assert_eq!("major".parse::<BumpLevel>().unwrap(), BumpLevel::Major);
        assert_eq!("PATCH".parse::<BumpLevel>().unwrap(), BumpLevel::Patch);
        assert!("huge".parse::<BumpLevel>().is_err());
    }

    #[test]
    fn test_asset_base_url_follows_cdn_flag() {
        let mut config = Config::default();
        assert_eq!(config.asset_base_url(), "");

        config.cdn = true;
        assert_eq!(config.asset_base_url(), config.urls.cdn_base);
    }

    #[test]
    fn test_app_base_url_follows_environment() {
        let mut config = Config::default();
        assert_eq!(config.app_base_url(), config.urls.development);

        config.environment = Environment::Prod;
        assert_eq!(config.app_base_url(), config.urls.production);
    }

    #[test]
    fn test_paths_layout() {
        let paths = Paths::rooted_at("/project");
        assert_eq!(paths.app_dir(), PathBuf::from("/project/src"));
        assert_eq!(paths.dist_dir(), PathBuf::from("/project/build/dist"));
        assert_eq!(
            paths.dist_scripts_dir(),
            PathBuf::from("/project/build/dist/scripts")
        );
        assert_eq!(
            paths.manifest_file(),
            PathBuf::from("/project/project.json")
        );
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
environment: prod
cdn: true
max_concurrent: 8
logging:
  level: debug
  format: compact
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.environment, Environment::Prod);
        assert!(config.cdn);
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_rejects_invalid_environment() {
        let yaml = "environment: staging";
        let result: std::result::Result<Config, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
