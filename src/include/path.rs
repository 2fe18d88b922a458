//! Lexical path resolution for `src` attributes

use std::path::{Component, Path, PathBuf};

/// Join `src` against `base` and normalize `.` and `..` without touching the filesystem.
///
/// An absolute `src` replaces `base`. `..` at the root is dropped; in a relative
/// result it is kept.
pub fn resolve_src(base: &Path, src: &str) -> PathBuf {
    normalize(&base.join(src))
}

/// Remove `.` components and fold `..` into its parent where possible.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
