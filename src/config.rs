//! Build configuration loaded from TOML
//!
//! ```toml
//! [build]
//! source_dir = "src"
//! pattern = "*.html"
//! out_dir = "build"
//! depfile = "build/templates.d"
//! ```
//!
//! Every key is optional. Relative paths in a file loaded with
//! [`BuildConfig::from_file`] resolve against the directory holding that file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "html-include.toml";

/// Errors that can occur when loading or parsing a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Where templates come from and where resolved pages go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory scanned for top-level templates (not recursive)
    pub source_dir: PathBuf,
    /// Glob matched against file names in `source_dir`
    pub pattern: String,
    /// Directory receiving one resolved file per template
    pub out_dir: PathBuf,
    /// Optional Make-style dependency file
    pub depfile: Option<PathBuf>,
    /// Resolve everything but write nothing
    pub dry_run: bool,
}

/// TOML structure for deserializing config files
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    build: Option<TomlBuild>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBuild {
    source_dir: Option<PathBuf>,
    pattern: Option<String>,
    out_dir: Option<PathBuf>,
    depfile: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            pattern: "*.html".to_string(),
            out_dir: PathBuf::from("build"),
            depfile: None,
            dry_run: false,
        }
    }
}

impl BuildConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str(&content)?;
        match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => Ok(config.relative_to(base)),
            _ => Ok(config),
        }
    }

    /// Load configuration from a TOML string, paths kept as written
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(match parsed.build {
            Some(build) => BuildConfig {
                source_dir: build.source_dir.unwrap_or(defaults.source_dir),
                pattern: build.pattern.unwrap_or(defaults.pattern),
                out_dir: build.out_dir.unwrap_or(defaults.out_dir),
                depfile: build.depfile,
                dry_run: false,
            },
            None => defaults,
        })
    }

    /// Anchor relative paths at `base`
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.source_dir = base.join(&self.source_dir);
        self.out_dir = base.join(&self.out_dir);
        self.depfile = self.depfile.map(|d| base.join(d));
        self
    }

    /// Set the template source directory
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Set the template file pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the output directory
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Set the depfile path
    pub fn with_depfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.depfile = Some(path.into());
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
