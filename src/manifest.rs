// ABOUTME: Project metadata manifest and semantic version handling
// ABOUTME: Loads, bumps, and persists the version field and renders the artifact banner

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::BumpLevel;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read project manifest: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse project manifest: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid version number '{value}' (expected major.minor.patch)")]
    InvalidVersion { value: String },
}

pub type Result<T> = std::result::Result<T, ManifestError>;

/// Project metadata persisted alongside the sources. The version field is
/// the single piece of state the bump task mutates in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A strict major.minor.patch triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn bumped(self, level: BumpLevel) -> Self {
        match level {
            BumpLevel::Major => Self::new(self.major + 1, 0, 0),
            BumpLevel::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpLevel::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl FromStr for Version {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ManifestError::InvalidVersion {
            value: s.to_string(),
        };

        let mut parts = s.split('.');
        let major = parts.next().ok_or_else(invalid)?;
        let minor = parts.next().ok_or_else(invalid)?;
        let patch = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
            patch: patch.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl ProjectManifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(self)?;
        contents.push('\n');
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    pub fn parsed_version(&self) -> Result<Version> {
        self.version.parse()
    }

    /// Increment the selected version field, keeping the manifest in sync.
    /// Returns the new version.
    pub fn bump(&mut self, level: BumpLevel) -> Result<Version> {
        let bumped = self.parsed_version()?.bumped(level);
        self.version = bumped.to_string();
        Ok(bumped)
    }

    /// Render the header comment prepended to compiled artifacts.
    pub fn banner(&self) -> String {
        let now = Utc::now();
        let today = format!("{}/{:02}/{}", now.day(), now.month(), now.year());
        let author = self
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("unknown");
        let license = match &self.license {
            Some(l) => match &l.url {
                Some(url) => format!("{}, {}", l.kind, url),
                None => l.kind.clone(),
            },
            None => "unlicensed".to_string(),
        };

        format!(
            "/**\n * {}\n * @version v{} - {}\n * @author {}\n * @copyright {}(c) {}\n * @license {}\n */\n",
            self.description,
            self.version,
            today,
            author,
            now.year(),
            author,
            license
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_manifest() -> ProjectManifest {
        ProjectManifest {
            name: "sample-app".to_string(),
            description: "A sample application".to_string(),
            version: "1.2.3".to_string(),
            author: Some(Author {
                name: "Jane Doe".to_string(),
                email: None,
            }),
            license: Some(License {
                kind: "MIT".to_string(),
                url: Some("https://opensource.org/licenses/MIT".to_string()),
            }),
        }
    }

    #[test]
    fn test_version_parsing() {
        let version: Version = "1.2.3".parse().unwrap();
        assert_eq!(version, Version::new(1, 2, 3));

        assert!("1.2".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
        assert!("1.2.x".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_bumping() {
        let version = Version::new(1, 2, 3);
        assert_eq!(version.bumped(BumpLevel::Patch), Version::new(1, 2, 4));
        assert_eq!(version.bumped(BumpLevel::Minor), Version::new(1, 3, 0));
        assert_eq!(version.bumped(BumpLevel::Major), Version::new(2, 0, 0));
    }

    #[test]
    fn test_manifest_bump_updates_version_field() {
        let mut manifest = sample_manifest();
        let bumped = manifest.bump(BumpLevel::Minor).unwrap();
        assert_eq!(bumped, Version::new(1, 3, 0));
        assert_eq!(manifest.version, "1.3.0");
    }

    #[test]
    fn test_manifest_bump_rejects_invalid_version() {
        let mut manifest = sample_manifest();
        manifest.version = "not-a-version".to_string();
        assert!(matches!(
            manifest.bump(BumpLevel::Patch),
            Err(ManifestError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_manifest_round_trip() {
        let manifest = sample_manifest();

        let mut temp_file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(&manifest).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();

        let loaded = ProjectManifest::load(temp_file.path()).unwrap();
        assert_eq!(loaded.name, "sample-app");
        assert_eq!(loaded.version, "1.2.3");
        assert_eq!(loaded.author.unwrap().name, "Jane Doe");
    }

    #[test]
    fn test_banner_contains_metadata() {
        let manifest = sample_manifest();
        let banner = manifest.banner();

        assert!(banner.starts_with("/**\n"));
        assert!(banner.contains("A sample application"));
        assert!(banner.contains("@version v1.2.3"));
        assert!(banner.contains("Jane Doe"));
        assert!(banner.contains("MIT"));
        assert!(banner.ends_with("*/\n"));
    }
}
