//! Host capabilities consumed by the resolver

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::path::normalize;

/// File access and dependency tracking supplied by the build system.
///
/// Methods take `&self` so one host can be shared between templates resolved
/// on different threads; implementations use interior mutability for the
/// dependency list.
pub trait IncludeHost {
    /// Read the text of the file at an absolute path
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Record that the file at an absolute path was consumed
    fn register_dependency(&self, path: &Path);

    /// Directory used when the caller supplies none
    fn current_dir(&self) -> &Path;
}

/// Host backed by the real filesystem
#[derive(Debug)]
pub struct FsHost {
    current_dir: PathBuf,
    dependencies: Mutex<Vec<PathBuf>>,
}

impl FsHost {
    /// Create a host rooted at `current_dir`, made absolute against the process working directory
    pub fn new(current_dir: impl AsRef<Path>) -> io::Result<Self> {
        let current_dir = normalize(&std::path::absolute(current_dir)?);
        Ok(Self {
            current_dir,
            dependencies: Mutex::new(Vec::new()),
        })
    }

    /// Dependencies registered so far, in registration order, duplicates kept
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consume the host and return its dependency list
    pub fn into_dependencies(self) -> Vec<PathBuf> {
        self.dependencies
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl IncludeHost for FsHost {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn register_dependency(&self, path: &Path) {
        self.dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());
    }

    fn current_dir(&self) -> &Path {
        &self.current_dir
    }
}

/// In-memory host for tests and for templates that do not live on disk
#[derive(Debug)]
pub struct MemoryHost {
    current_dir: PathBuf,
    files: HashMap<PathBuf, String>,
    dependencies: Mutex<Vec<PathBuf>>,
    reads: AtomicUsize,
}

impl MemoryHost {
    /// Create an empty host whose ambient directory is `current_dir`
    pub fn new(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: current_dir.into(),
            files: HashMap::new(),
            dependencies: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
        }
    }

    /// Add a file at an absolute path
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a file at an absolute path
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }

    /// Dependencies registered so far, in registration order, duplicates kept
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `read_file` calls, successful or not
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl IncludeHost for MemoryHost {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn register_dependency(&self, path: &Path) {
        self.dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());
    }

    fn current_dir(&self) -> &Path {
        &self.current_dir
    }
}
