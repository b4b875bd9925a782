use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Where configuration text comes from.
///
/// Names are opaque to the loader except for one convention: a name starting
/// with `.` is relative to the directory of the config that includes it.
pub trait ConfigSource {
    /// Text of the config called `name`, or `Ok(None)` if no such config
    /// exists. Other failures are returned as I/O errors.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the config exists but cannot be
    /// read.
    fn read(&self, name: &str) -> io::Result<Option<String>>;

    /// Canonical name of `name` as seen from the config `parent`
    /// (`None` for the top-level request). The canonical name is the identity
    /// used for include cycle detection.
    fn resolve_name(&self, name: &str, parent: Option<&str>) -> String {
        join_relative(name, parent)
    }
}

/// Reads configs from files below a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ConfigSource for FsSource {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.root.join(name)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Configs held in memory, keyed by canonical name. Handy for tests and for
/// callers that generate configuration text.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a config. `name` is canonicalized the same way include targets are.
    #[must_use]
    pub fn with(mut self, name: &str, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: &str, text: impl Into<String>) {
        self.files.insert(join_relative(name, None), text.into());
    }
}

impl ConfigSource for MemorySource {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        Ok(self.files.get(name).cloned())
    }
}

/// Resolve `name` against the directory of `parent` when it starts with `.`,
/// then drop `.` and `..` components lexically.
pub(crate) fn join_relative(name: &str, parent: Option<&str>) -> String {
    let joined = match parent {
        Some(parent) if name.starts_with('.') => Path::new(parent)
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(name),
        _ => PathBuf::from(name),
    };
    normalize(&joined).to_string_lossy().into_owned()
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_ignore_parent() {
        assert_eq!(join_relative("common", Some("dir/main")), "common");
        assert_eq!(join_relative("dir/common", None), "dir/common");
    }

    #[test]
    fn dot_names_resolve_against_parent_directory() {
        assert_eq!(join_relative("./local", Some("dir/main")), "dir/local");
        assert_eq!(join_relative("../up", Some("a/b/main")), "a/up");
        assert_eq!(join_relative("./x", Some("main")), "x");
    }

    #[test]
    fn normalize_keeps_leading_parent_components() {
        assert_eq!(join_relative("../x", Some("main")), "../x");
        assert_eq!(join_relative("./a/./b/../c", None), "a/c");
    }

    #[test]
    fn memory_source_reads_by_canonical_name() {
        let source = MemorySource::new().with("./dir/a", "build([\"x\"])");
        assert_eq!(
            source.read("dir/a").unwrap().as_deref(),
            Some("build([\"x\"])")
        );
        assert!(source.read("missing").unwrap().is_none());
    }

    #[test]
    fn fs_source_distinguishes_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present"), "build([\"a\"])").unwrap();

        let source = FsSource::new(dir.path());
        assert!(source.read("present").unwrap().is_some());
        assert!(source.read("absent").unwrap().is_none());
        assert_eq!(source.root(), dir.path());
    }
}
