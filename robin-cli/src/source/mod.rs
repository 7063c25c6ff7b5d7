//! Template sources
//!
//! A template source is a read-only tree of directories and files addressed
//! by slash-separated paths relative to the template root. The root itself is
//! the empty path.
//!
//! Three sources are provided:
//! - [`EmbeddedSource`] - the app template bundled into the binary
//! - [`DirSource`] - a template directory on disk
//! - [`MemorySource`] - an in-memory tree, also the index behind the embedded source

use std::borrow::Cow;
use std::fmt;
use std::io;

use thiserror::Error;

use crate::error::{ScaffoldError, ScaffoldResult};

pub mod dir;
pub mod embedded;
pub mod memory;

pub use dir::DirSource;
pub use embedded::EmbeddedSource;
pub use memory::MemorySource;

/// Errors produced when validating a template path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTemplatePath {
    /// Path starts at the filesystem root
    #[error("template path must be relative: {0}")]
    Absolute(String),

    /// Path climbs out of the template root
    #[error("template path must not contain '..': {0}")]
    ParentSegment(String),

    /// A single path segment was expected
    #[error("invalid template entry name: {0:?}")]
    InvalidName(String),

    /// The path is already used by an entry of the other kind
    #[error("template path is both a file and a directory: {0}")]
    Conflict(String),
}

/// Slash-normalized path relative to the template root
///
/// The root is the empty path and displays as `.`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplatePath(String);

impl TemplatePath {
    /// The template root
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Parse and normalize a relative path.
    ///
    /// Backslashes become slashes, `.` and empty segments are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error for absolute paths and paths containing `..`.
    pub fn parse(raw: &str) -> Result<Self, InvalidTemplatePath> {
        let normalized = raw.replace('\\', "/");
        if normalized.starts_with('/') {
            return Err(InvalidTemplatePath::Absolute(raw.to_string()));
        }

        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(InvalidTemplatePath::ParentSegment(raw.to_string())),
                name => segments.push(name),
            }
        }

        Ok(Self(segments.join("/")))
    }

    /// Path of the child `name` of this directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a single plain segment.
    pub fn join(&self, name: &str) -> Result<Self, InvalidTemplatePath> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(InvalidTemplatePath::InvalidName(name.to_string()));
        }

        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{name}", self.0)))
        }
    }

    /// Whether this is the template root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The normalized path, empty for the root.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    /// Last segment, `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Containing directory, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(self.0.rsplit_once('/').map_or_else(Self::root, |(parent, _)| {
            Self(parent.to_string())
        }))
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Kind of a template entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory
    Directory,
    /// A file whose content is rendered
    File,
}

/// A node of a template tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Path relative to the template root
    pub path: TemplatePath,
    /// Directory or file
    pub kind: EntryKind,
}

impl TemplateEntry {
    /// A directory entry
    #[must_use]
    pub const fn directory(path: TemplatePath) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
        }
    }

    /// A file entry
    #[must_use]
    pub const fn file(path: TemplatePath) -> Self {
        Self {
            path,
            kind: EntryKind::File,
        }
    }

    /// Whether this entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Read-only hierarchical byte-content provider
pub trait TemplateSource {
    /// List the direct children of the directory `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` does not exist or cannot be listed.
    fn list(&self, dir: &TemplatePath) -> io::Result<Vec<TemplateEntry>>;

    /// Read the full content of the file `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` does not exist or cannot be read.
    fn read(&self, file: &TemplatePath) -> io::Result<Cow<'_, [u8]>>;

    /// Human readable description for log output
    fn describe(&self) -> String;
}

/// Walk `source` depth-first in pre-order, starting with the root entry.
///
/// Children of a directory are visited in lexical order after the directory
/// itself. Each entry is visited once. The first error returned by `visit`
/// or by listing a directory aborts the walk.
///
/// # Errors
///
/// Returns [`ScaffoldError::TemplateWalk`] if a directory cannot be listed,
/// or whatever error `visit` returns.
pub fn walk<S, F>(source: &S, mut visit: F) -> ScaffoldResult<()>
where
    S: TemplateSource + ?Sized,
    F: FnMut(&TemplateEntry) -> ScaffoldResult<()>,
{
    walk_entry(source, &TemplateEntry::directory(TemplatePath::root()), &mut visit)
}

fn walk_entry<S, F>(source: &S, entry: &TemplateEntry, visit: &mut F) -> ScaffoldResult<()>
where
    S: TemplateSource + ?Sized,
    F: FnMut(&TemplateEntry) -> ScaffoldResult<()>,
{
    visit(entry)?;

    if !entry.is_dir() {
        return Ok(());
    }

    let mut children = source
        .list(&entry.path)
        .map_err(|source| ScaffoldError::TemplateWalk {
            path: entry.path.clone(),
            source,
        })?;
    children.sort_by(|a, b| a.path.cmp(&b.path));
    children.dedup_by(|a, b| a.path == b.path);

    for child in &children {
        // Only direct children, so the walk always terminates
        if child.path.parent().as_ref() != Some(&entry.path) {
            return Err(ScaffoldError::TemplateWalk {
                path: child.path.clone(),
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("entry is not a child of '{}'", entry.path),
                ),
            });
        }
        walk_entry(source, child, visit)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(TemplatePath::parse("a/b.txt").unwrap().as_str(), "a/b.txt");
        assert_eq!(TemplatePath::parse("./a//b/").unwrap().as_str(), "a/b");
        assert_eq!(TemplatePath::parse("a\\b").unwrap().as_str(), "a/b");
        assert!(TemplatePath::parse("").unwrap().is_root());
        assert!(TemplatePath::parse(".").unwrap().is_root());
    }

    #[test]
    fn test_parse_rejects_escapes() {
        assert!(matches!(
            TemplatePath::parse("/etc/passwd"),
            Err(InvalidTemplatePath::Absolute(_))
        ));
        assert!(matches!(
            TemplatePath::parse("a/../../b"),
            Err(InvalidTemplatePath::ParentSegment(_))
        ));
    }

    #[test]
    fn test_parent_and_name() {
        let path = TemplatePath::parse("src/pages/index.tsx").unwrap();
        assert_eq!(path.name(), Some("index.tsx"));
        assert_eq!(path.parent().unwrap().as_str(), "src/pages");

        let top = TemplatePath::parse("package.json").unwrap();
        assert!(top.parent().unwrap().is_root());
        assert_eq!(TemplatePath::root().parent(), None);
        assert_eq!(TemplatePath::root().name(), None);
    }

    #[test]
    fn test_join() {
        let dir = TemplatePath::parse("src").unwrap();
        assert_eq!(dir.join("main.ts").unwrap().as_str(), "src/main.ts");
        assert_eq!(TemplatePath::root().join("a").unwrap().as_str(), "a");
        assert!(dir.join("..").is_err());
        assert!(dir.join("a/b").is_err());
        assert!(dir.join("").is_err());
    }

    #[test]
    fn test_root_displays_as_dot() {
        assert_eq!(TemplatePath::root().to_string(), ".");
    }

    #[test]
    fn test_walk_is_preorder_and_sorted() {
        let source = MemorySource::new()
            .with_file("b.txt", "b")
            .unwrap()
            .with_file("a/z.txt", "z")
            .unwrap()
            .with_file("a/c/d.txt", "d")
            .unwrap();

        let mut visited = Vec::new();
        walk(&source, |entry| {
            visited.push(entry.path.to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(visited, vec![".", "a", "a/c", "a/c/d.txt", "a/z.txt", "b.txt"]);
    }

    #[test]
    fn test_walk_stops_at_first_error() {
        let source = MemorySource::new()
            .with_file("a.txt", "a")
            .unwrap()
            .with_file("b.txt", "b")
            .unwrap();

        let mut count = 0;
        let result = walk(&source, |entry| {
            count += 1;
            if entry.path.as_str() == "a.txt" {
                return Err(ScaffoldError::TemplateWalk {
                    path: entry.path.clone(),
                    source: io::Error::other("boom"),
                });
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(count, 2);
    }

    struct BrokenSource;

    impl TemplateSource for BrokenSource {
        fn list(&self, _dir: &TemplatePath) -> io::Result<Vec<TemplateEntry>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn read(&self, _file: &TemplatePath) -> io::Result<Cow<'_, [u8]>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn test_walk_reports_listing_failure() {
        let err = walk(&BrokenSource, |_| Ok(())).unwrap_err();
        assert!(matches!(err, ScaffoldError::TemplateWalk { ref path, .. } if path.is_root()));
    }
}
