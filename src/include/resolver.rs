//! Include resolution - expands directives into the text of the files they name

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::IncludeError;

use super::directive::{find_directives, has_directive};
use super::host::IncludeHost;
use super::path::{normalize, resolve_src};

/// State carried down one recursion path
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolutionContext {
    /// Files currently being expanded, outermost first (for cycle detection)
    resolving: Vec<PathBuf>,
}

impl ResolutionContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for expanding the text of a known file
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            resolving: vec![path.into()],
        }
    }

    /// File whose text is being scanned, if known
    pub fn origin(&self) -> Option<&Path> {
        self.resolving.last().map(PathBuf::as_path)
    }

    /// Check if a file is currently being expanded (cycle detection)
    pub fn is_resolving(&self, path: &Path) -> bool {
        self.resolving.iter().any(|p| p == path)
    }

    /// Chain from the first expansion of `path` down to `path` again
    pub fn cycle_through(&self, path: &Path) -> Vec<PathBuf> {
        let start = self
            .resolving
            .iter()
            .position(|p| p == path)
            .unwrap_or(0);
        let mut chain = self.resolving[start..].to_vec();
        chain.push(path.to_path_buf());
        chain
    }

    /// Mark a file as being expanded
    pub fn start_resolving(&mut self, path: PathBuf) {
        self.resolving.push(path);
    }

    /// Mark the innermost file as done
    pub fn done_resolving(&mut self) {
        self.resolving.pop();
    }
}

/// Expand every include directive in `content`
///
/// Relative `src` paths resolve against `dir`, or against the host's current
/// directory when `dir` is `None`. Each included file is itself expanded with
/// its own directory as the base. Every inclusion occurrence is registered
/// with the host before the file is read, duplicates included.
///
/// Text without directives is returned unchanged and the host is not touched.
///
/// # Example
///
/// ```rust
/// use html_include::{resolve, MemoryHost};
///
/// let host = MemoryHost::new("/site").with_file("/site/nav.html", "<nav/>");
/// let html = resolve(r#"<body><include src="nav.html" /></body>"#, &host, None).unwrap();
///
/// assert_eq!(html, "<body><nav/></body>");
/// assert_eq!(host.dependencies().len(), 1);
/// ```
pub fn resolve<H>(content: &str, host: &H, dir: Option<&Path>) -> Result<String, IncludeError>
where
    H: IncludeHost + ?Sized,
{
    let mut ctx = ResolutionContext::new();
    expand(content, host, dir, &mut ctx)
}

/// Read a top-level template through the host and expand it against its own directory
///
/// The template itself is not registered as a dependency. It does take part
/// in cycle detection, so a file that includes itself is reported.
pub fn resolve_file<H>(path: &Path, host: &H) -> Result<String, IncludeError>
where
    H: IncludeHost + ?Sized,
{
    let path = normalize(&host.current_dir().join(path));
    let content = host
        .read_file(&path)
        .map_err(|source| IncludeError::Read {
            path: path.clone(),
            origin: None,
            span: 0..0,
            source,
        })?;

    let dir = path.parent().map(Path::to_path_buf);
    let mut ctx = ResolutionContext::for_file(path);
    expand(&content, host, dir.as_deref(), &mut ctx)
}

/// Expand `content` in the given context, recursing into included files
fn expand<H>(
    content: &str,
    host: &H,
    dir: Option<&Path>,
    ctx: &mut ResolutionContext,
) -> Result<String, IncludeError>
where
    H: IncludeHost + ?Sized,
{
    if !has_directive(content) {
        trace!(origin = ?ctx.origin(), "no include directives");
        return Ok(content.to_string());
    }

    // A relative `dir` resolves against the host's directory
    let base = match dir {
        Some(dir) => normalize(&host.current_dir().join(dir)),
        None => host.current_dir().to_path_buf(),
    };
    let mut output = String::with_capacity(content.len());
    let mut last = 0;

    for directive in find_directives(content) {
        output.push_str(&content[last..directive.span.start]);

        let path = resolve_src(&base, &directive.src);
        debug!(src = %directive.src, path = %path.display(), "expanding include");
        host.register_dependency(&path);

        if ctx.is_resolving(&path) {
            return Err(IncludeError::Circular {
                chain: ctx.cycle_through(&path),
                origin: ctx.origin().map(Path::to_path_buf),
                span: directive.span,
            });
        }

        let text = host
            .read_file(&path)
            .map_err(|source| IncludeError::Read {
                path: path.clone(),
                origin: ctx.origin().map(Path::to_path_buf),
                span: directive.span.clone(),
                source,
            })?;

        let nested_dir = path.parent().map(Path::to_path_buf);
        ctx.start_resolving(path);
        let expanded = expand(&text, host, nested_dir.as_deref(), ctx);
        ctx.done_resolving();

        output.push_str(&expanded?);
        last = directive.span.end;
    }

    output.push_str(&content[last..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::io;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::include::MemoryHost;

    #[test]
    fn test_no_directives_is_identity_without_host_calls() {
        let host = MemoryHost::new("/site");
        let content = "<html>\n<body><p>include nothing</p></body>\n</html>";
        assert_eq!(resolve(content, &host, None).unwrap(), content);
        assert_eq!(host.read_count(), 0);
        assert!(host.dependencies().is_empty());
    }

    #[test]
    fn test_single_include_replaced_exactly() {
        let host = MemoryHost::new("/site").with_file("/site/B.html", "<p>B</p>");
        let out = resolve(r#"<main><include src="B.html"/></main>"#, &host, None).unwrap();
        assert_eq!(out, "<main><p>B</p></main>");
        assert_eq!(host.dependencies(), vec![PathBuf::from("/site/B.html")]);
    }

    #[test]
    fn test_dir_argument_overrides_current_dir() {
        let host = MemoryHost::new("/elsewhere").with_file("/site/B.html", "b");
        let out = resolve("<include src='B.html'/>", &host, Some(Path::new("/site"))).unwrap();
        assert_eq!(out, "b");
    }

    #[test]
    fn test_relative_dir_is_anchored_on_host() {
        let host = MemoryHost::new("/site")
            .with_file("/site/partials/x.html", "x<include src=\"y.html\"/>")
            .with_file("/site/partials/y.html", "y");
        let out = resolve("<include src=\"x.html\"/>", &host, Some(Path::new("partials"))).unwrap();
        assert_eq!(out, "xy");
        assert_eq!(
            host.dependencies(),
            vec![
                PathBuf::from("/site/partials/x.html"),
                PathBuf::from("/site/partials/y.html"),
            ]
        );
        assert!(host.dependencies().iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_nested_include_rebases_on_included_file_dir() {
        let host = MemoryHost::new("/site")
            .with_file("/x/B.html", r#"[b <include src="C.html"/>]"#)
            .with_file("/x/C.html", "c")
            .with_file("/site/C.html", "wrong");
        let out = resolve(r#"<include src="../x/B.html"/>"#, &host, None).unwrap();
        assert_eq!(out, "[b c]");
        assert_eq!(
            host.dependencies(),
            vec![PathBuf::from("/x/B.html"), PathBuf::from("/x/C.html")]
        );
    }

    #[test]
    fn test_same_file_twice_expands_and_registers_twice() {
        let host = MemoryHost::new("/site").with_file("/site/B.html", "b");
        let out = resolve(
            r#"<include src="B.html"></include>|<include src="B.html"></include>"#,
            &host,
            None,
        )
        .unwrap();
        assert_eq!(out, "b|b");
        assert_eq!(
            host.dependencies(),
            vec![PathBuf::from("/site/B.html"), PathBuf::from("/site/B.html")]
        );
    }

    #[test]
    fn test_missing_file_fails_after_earlier_registrations() {
        let host = MemoryHost::new("/site").with_file("/site/ok.html", "ok");
        let err = resolve(
            r#"<include src="ok.html"/><include src="missing.html"/><include src="ok.html"/>"#,
            &host,
            None,
        )
        .unwrap_err();

        match &err {
            IncludeError::Read { path, origin, source, .. } => {
                assert_eq!(path, Path::new("/site/missing.html"));
                assert_eq!(*origin, None);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected read error, got {other:?}"),
        }
        assert_eq!(
            host.dependencies(),
            vec![PathBuf::from("/site/ok.html"), PathBuf::from("/site/missing.html")]
        );
    }

    #[test]
    fn test_missing_nested_file_reports_including_file() {
        let host = MemoryHost::new("/site")
            .with_file("/site/partials/nav.html", "<nav><include src=\"logo.html\"/></nav>");
        let err = resolve("<include src=\"partials/nav.html\"/>", &host, None).unwrap_err();
        assert_eq!(err.origin(), Some(Path::new("/site/partials/nav.html")));
        assert_eq!(err.span(), 5..31);
    }

    #[test]
    fn test_cycle_is_reported_not_expanded() {
        let host = MemoryHost::new("/site")
            .with_file("/site/a.html", "a<include src=\"b.html\"/>")
            .with_file("/site/b.html", "b<include src=\"a.html\"/>");
        let err = resolve_file(Path::new("a.html"), &host).unwrap_err();
        match err {
            IncludeError::Circular { chain, origin, .. } => {
                assert_eq!(
                    chain,
                    vec![
                        PathBuf::from("/site/a.html"),
                        PathBuf::from("/site/b.html"),
                        PathBuf::from("/site/a.html"),
                    ]
                );
                assert_eq!(origin, Some(PathBuf::from("/site/b.html")));
            }
            other => panic!("expected circular include, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_below_anonymous_content() {
        let host = MemoryHost::new("/site")
            .with_file("/site/a.html", "<include src=\"b.html\"/>")
            .with_file("/site/b.html", "<include src=\"a.html\"/>");
        let err = resolve("<include src=\"a.html\"/>", &host, None).unwrap_err();
        assert!(matches!(err, IncludeError::Circular { ref chain, .. } if chain.len() == 3));
    }

    #[test]
    fn test_self_include_is_a_cycle() {
        let host = MemoryHost::new("/site").with_file("/site/a.html", "<include src=\"./a.html\"/>");
        let err = resolve_file(Path::new("/site/a.html"), &host).unwrap_err();
        assert!(matches!(err, IncludeError::Circular { .. }));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let host = MemoryHost::new("/site")
            .with_file("/site/left.html", "L<include src=\"shared.html\"/>")
            .with_file("/site/right.html", "R<include src=\"shared.html\"/>")
            .with_file("/site/shared.html", "s");
        let out = resolve(
            "<include src=\"left.html\"/><include src=\"right.html\"/>",
            &host,
            None,
        )
        .unwrap();
        assert_eq!(out, "LsRs");
        assert_eq!(host.dependencies().len(), 4);
    }

    #[test]
    fn test_resolve_file_does_not_register_entry() {
        let host = MemoryHost::new("/site")
            .with_file("/site/index.html", "<include src=\"part.html\"/>!")
            .with_file("/site/part.html", "part");
        assert_eq!(resolve_file(Path::new("index.html"), &host).unwrap(), "part!");
        assert_eq!(host.dependencies(), vec![PathBuf::from("/site/part.html")]);
    }

    #[test]
    fn test_works_through_trait_object() {
        let host = MemoryHost::new("/site").with_file("/site/x.html", "x");
        let dyn_host: &dyn IncludeHost = &host;
        assert_eq!(resolve("<include src='x.html'/>", dyn_host, None).unwrap(), "x");
    }
}
