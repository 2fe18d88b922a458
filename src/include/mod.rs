//! Include system for page templates
//!
//! This module expands `<include>` directives in template text. Each directive
//! names another file whose text replaces the directive, after that file's own
//! directives have been expanded relative to its own directory. Every file read
//! this way is reported to the [`IncludeHost`] so a build system can rebuild the
//! template when one of its parts changes.
//!
//! # Example
//!
//! ```text
//! <!-- src/index.html -->
//! <body>
//!     <include src="partials/header.html" />
//!     <include src='partials/footer.html'></include>
//! </body>
//!
//! <!-- src/partials/header.html: resolved relative to src/partials/ -->
//! <header><include src="logo.html"/></header>
//! ```

mod directive;
mod host;
mod path;
mod resolver;

pub use directive::{find_directives, has_directive, Directive};
pub use host::{FsHost, IncludeHost, MemoryHost};
pub use path::resolve_src;
pub use resolver::{resolve, resolve_file};
