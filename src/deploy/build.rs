// ABOUTME: Local build directory enumeration, validation, and content fingerprinting.
// ABOUTME: Upload and hashing share one file list so the hash always matches what is uploaded.

use sha2::{Digest, Sha256};
use snafu::ResultExt;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::error::{DeployError, ReadFileSnafu, WalkBuildSnafu};
use super::rejection::Rejection;
use crate::types::{ENTRY_POINT, SnapshotHash, is_reserved_path};

/// Directory names never included in a build, at any depth.
pub const IGNORED_DIRS: &[&str] = &["node_modules", ".git"];

/// Marker of a source tree rather than a build output.
pub const SOURCE_MARKER: &str = "package.json";

/// A build output directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalBuild {
    root: PathBuf,
    /// Relative, `/`-separated, sorted.
    files: Vec<String>,
}

impl LocalBuild {
    /// Enumerate the files of a build directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DeployError> {
        let root = root.into();
        let mut files = Vec::new();

        let walker = WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_ignored(e));

        for entry in walker {
            let entry = entry.context(WalkBuildSnafu { path: &root })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(relative) = relative_key(&root, entry.path()) {
                files.push(relative);
            }
        }

        files.sort();
        tracing::debug!("Found {} file(s) in {}", files.len(), root.display());
        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths of all included files.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(relative)).is_ok()
    }

    /// Check the build is deployable; `None` means it is.
    pub fn validate(&self) -> Option<Rejection> {
        if !self.contains(ENTRY_POINT) {
            return Some(Rejection::NoIndex);
        }
        if self.contains(SOURCE_MARKER) {
            return Some(Rejection::HasPackageJson);
        }
        if self.files.iter().any(|f| is_reserved_path(f)) {
            return Some(Rejection::ReservedPath);
        }
        None
    }

    /// Absolute path of an included file.
    pub fn path_of(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Deterministic fingerprint of the included files.
    ///
    /// Covers every relative path and its bytes, so renaming, adding,
    /// removing, or editing a file changes the result.
    pub fn fingerprint(&self) -> Result<SnapshotHash, DeployError> {
        let mut hasher = Sha256::new();

        for relative in &self.files {
            let path = self.path_of(relative);
            let content = std::fs::read(&path).context(ReadFileSnafu { path: &path })?;

            hasher.update(relative.as_bytes());
            hasher.update([0u8]);
            hasher.update(Sha256::digest(&content));
        }

        Ok(SnapshotHash::from_digest(hex::encode(hasher.finalize())))
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

/// Relative `/`-joined key of `path` under `root`.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn ignores_node_modules_and_git_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html>");
        write(dir.path(), "node_modules/x/index.js", "x");
        write(dir.path(), ".git/HEAD", "ref");
        write(dir.path(), "nested/node_modules/y.js", "y");
        write(dir.path(), "assets/app.js", "app");

        let build = LocalBuild::open(dir.path()).unwrap();
        assert_eq!(build.files(), &["assets/app.js", "index.html"]);
    }

    #[test]
    fn keeps_dotfiles_other_than_git() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html>");
        write(dir.path(), ".well-known/security.txt", "contact");

        let build = LocalBuild::open(dir.path()).unwrap();
        assert!(build.contains(".well-known/security.txt"));
    }

    #[test]
    fn validate_requires_index() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.html", "about");

        let build = LocalBuild::open(dir.path()).unwrap();
        assert_eq!(build.validate(), Some(Rejection::NoIndex));
    }

    #[test]
    fn validate_refuses_source_tree() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html>");
        write(dir.path(), "package.json", "{}");

        let build = LocalBuild::open(dir.path()).unwrap();
        assert_eq!(build.validate(), Some(Rejection::HasPackageJson));
    }

    #[test]
    fn validate_refuses_engine_namespace() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html>");
        write(dir.path(), "__DEPLOYMENTS_META__/current", "abc123");

        let build = LocalBuild::open(dir.path()).unwrap();
        assert_eq!(build.validate(), Some(Rejection::ReservedPath));
    }

    #[test]
    fn nested_package_json_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html>");
        write(dir.path(), "vendor/package.json", "{}");

        let build = LocalBuild::open(dir.path()).unwrap();
        assert_eq!(build.validate(), None);
    }

    #[test]
    fn fingerprint_changes_with_rename() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html>");
        write(dir.path(), "a.txt", "same");
        let before = LocalBuild::open(dir.path()).unwrap().fingerprint().unwrap();

        fs::rename(dir.path().join("a.txt"), dir.path().join("b.txt")).unwrap();
        let after = LocalBuild::open(dir.path()).unwrap().fingerprint().unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn fingerprint_ignores_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", "<html>");
        let before = LocalBuild::open(dir.path()).unwrap().fingerprint().unwrap();

        write(dir.path(), "node_modules/pkg/index.js", "noise");
        let after = LocalBuild::open(dir.path()).unwrap().fingerprint().unwrap();

        assert_eq!(before, after);
        assert_eq!(before.as_str().len(), 64);
    }
}
