//! Build driver: discovers top-level templates, resolves them, writes pages
//!
//! Each template is resolved with its own [`FsHost`], so the dependency list
//! of one page never leaks into another. The lists come back in the
//! [`BuildReport`] instead of being collected on the side.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::include::{resolve_file, FsHost};
use crate::BuildError;

/// One resolved template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateOutput {
    /// Template that was resolved
    pub source: PathBuf,
    /// File the resolved text was (or would be) written to
    pub output: PathBuf,
    /// Every included file, in registration order, duplicates kept
    pub dependencies: Vec<PathBuf>,
}

/// Result of building every discovered template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub templates: Vec<TemplateOutput>,
}

impl BuildReport {
    /// Render a Make-style depfile, one rule per template
    ///
    /// Prerequisites are the template followed by its includes, each listed
    /// once in first-seen order.
    pub fn depfile(&self) -> String {
        let mut out = String::new();
        for template in &self.templates {
            let mut prerequisites = vec![template.source.as_path()];
            for dep in &template.dependencies {
                if !prerequisites.contains(&dep.as_path()) {
                    prerequisites.push(dep);
                }
            }

            out.push_str(&escape_make(&template.output));
            out.push(':');
            for prerequisite in prerequisites {
                out.push(' ');
                out.push_str(&escape_make(prerequisite));
            }
            out.push('\n');
        }
        out
    }
}

fn escape_make(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "\\\\")
        .replace(' ', "\\ ")
        .replace('#', "\\#")
        .replace('$', "$$")
}

/// Find top-level templates in `source_dir` whose names match `pattern`
///
/// Subdirectories are not descended into, so partials kept in nested folders
/// are only ever reached through includes. Results are sorted.
pub fn discover_templates(source_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, BuildError> {
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&source_dir.to_string_lossy()),
        pattern
    );

    let entries = glob::glob(&full_pattern).map_err(|source| BuildError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut templates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BuildError::Scan {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            templates.push(path);
        }
    }

    templates.sort();
    debug!(count = templates.len(), dir = %source_dir.display(), "discovered templates");
    Ok(templates)
}

/// Resolve one template and write it to `out_dir` under the same file name
///
/// Nothing is written when `dry_run` is set or when resolution fails.
pub fn build_template(
    template: &Path,
    out_dir: &Path,
    dry_run: bool,
) -> Result<TemplateOutput, BuildError> {
    let file_name = template
        .file_name()
        .ok_or_else(|| BuildError::NotAFile {
            path: template.to_path_buf(),
        })?;
    let dir = match template.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let host = FsHost::new(dir).map_err(|source| BuildError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;
    let resolved = resolve_file(Path::new(file_name), &host).map_err(|source| {
        BuildError::Include {
            template: template.to_path_buf(),
            source,
        }
    })?;

    let output = out_dir.join(file_name);
    if !dry_run {
        fs::create_dir_all(out_dir).map_err(|source| BuildError::Write {
            path: out_dir.to_path_buf(),
            source,
        })?;
        fs::write(&output, &resolved).map_err(|source| BuildError::Write {
            path: output.clone(),
            source,
        })?;
    }

    let dependencies = host.into_dependencies();
    info!(
        template = %template.display(),
        output = %output.display(),
        dependencies = dependencies.len(),
        dry_run,
        "built template"
    );

    Ok(TemplateOutput {
        source: template.to_path_buf(),
        output,
        dependencies,
    })
}

/// Build every template the configuration selects
///
/// The first template that fails aborts the build. Templates built before it
/// keep their written output.
pub fn build(config: &BuildConfig) -> Result<BuildReport, BuildError> {
    let mut report = BuildReport::default();
    for template in discover_templates(&config.source_dir, &config.pattern)? {
        report
            .templates
            .push(build_template(&template, &config.out_dir, config.dry_run)?);
    }

    if let Some(depfile) = config.depfile.as_ref().filter(|_| !config.dry_run) {
        write_depfile(&report, depfile)?;
    }

    Ok(report)
}

/// Write the report's Make rules to `path`, creating parent directories
pub fn write_depfile(report: &BuildReport, path: &Path) -> Result<(), BuildError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, report.depfile()).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
