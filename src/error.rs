//! Error types for include resolution

use std::io;
use std::path::{Path, PathBuf};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in template text
pub type Span = std::ops::Range<usize>;

/// Errors that abort the resolution of a template
///
/// `origin` is the file holding the failing directive, `None` when the
/// directive sits in text handed to the resolver directly. `span` is the
/// directive's byte range in that text.
#[derive(Error, Debug)]
pub enum IncludeError {
    /// Included file could not be read
    #[error("cannot read included file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        origin: Option<PathBuf>,
        span: Span,
        #[source]
        source: io::Error,
    },

    /// A file includes itself, directly or through other files
    #[error("circular include: {}", format_chain(chain))]
    Circular {
        chain: Vec<PathBuf>,
        origin: Option<PathBuf>,
        span: Span,
    },
}

impl IncludeError {
    /// File holding the directive that failed
    pub fn origin(&self) -> Option<&Path> {
        match self {
            IncludeError::Read { origin, .. } | IncludeError::Circular { origin, .. } => {
                origin.as_deref()
            }
        }
    }

    /// Byte range of the failing directive within its origin
    pub fn span(&self) -> Span {
        match self {
            IncludeError::Read { span, .. } | IncludeError::Circular { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// `source` must be the text of the origin file (or of the top-level
    /// content when there is no origin).
    pub fn format(&self, source: &str, filename: &str, color: bool) -> String {
        let span = self.span();
        let (message, label) = match self {
            IncludeError::Read { path, source: io_err, .. } => (
                format!("cannot read {}", path.display()),
                format!("included here: {}", io_err),
            ),
            IncludeError::Circular { chain, .. } => (
                "circular include".to_string(),
                format!("this closes the cycle {}", format_chain(chain)),
            ),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(color))
            .with_message(message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
