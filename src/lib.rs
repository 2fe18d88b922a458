//! html-include - nested `<include>` expansion for page templates
//!
//! This library expands `<include src="...">` directives in template text,
//! recursively, and reports every file it reads so a build system can rebuild
//! a page when any of its parts change.
//!
//! # Example
//!
//! ```rust
//! use html_include::{resolve, MemoryHost};
//!
//! let host = MemoryHost::new("/site")
//!     .with_file("/site/partials/header.html", r#"<header><include src="logo.html"/></header>"#)
//!     .with_file("/site/partials/logo.html", "<img src=\"logo.svg\">");
//!
//! let html = resolve(r#"<include src="partials/header.html" />"#, &host, None).unwrap();
//! assert_eq!(html, r#"<header><img src="logo.svg"></header>"#);
//! ```

pub mod build;
pub mod config;
pub mod error;
pub mod include;

use std::path::PathBuf;

use thiserror::Error;

pub use build::{
    build, build_template, discover_templates, write_depfile, BuildReport, TemplateOutput,
};
pub use config::{BuildConfig, ConfigError, DEFAULT_CONFIG_FILE};
pub use error::IncludeError;
pub use include::{
    find_directives, resolve, resolve_file, Directive, FsHost, IncludeHost, MemoryHost,
};

/// Errors that can occur while building a set of templates
#[derive(Debug, Error)]
pub enum BuildError {
    /// Template glob does not compile
    #[error("invalid template pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Directory or template could not be inspected
    #[error("cannot scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template path has no file name
    #[error("not a template file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// Error during include resolution
    #[error("failed to resolve {}: {source}", template.display())]
    Include {
        template: PathBuf,
        #[source]
        source: IncludeError,
    },

    /// Output could not be written
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error loading configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Load the build configuration, falling back to defaults when `path` is
/// `None` and no default config file exists
pub fn load_config(path: Option<&std::path::Path>) -> Result<BuildConfig, BuildError> {
    match path {
        Some(path) => Ok(BuildConfig::from_file(path)?),
        None => {
            let default = std::path::Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                Ok(BuildConfig::from_file(default)?)
            } else {
                Ok(BuildConfig::default())
            }
        }
    }
}
