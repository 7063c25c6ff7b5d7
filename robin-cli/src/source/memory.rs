//! In-memory template tree

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

use super::{InvalidTemplatePath, TemplateEntry, TemplatePath, TemplateSource};

/// Template tree held in memory
///
/// Directories are implied by the files inserted below them. Empty
/// directories can be added explicitly with [`MemorySource::insert_dir`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<TemplatePath, Vec<u8>>,
    directories: BTreeSet<TemplatePath>,
}

impl MemorySource {
    /// Create an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, returning the tree for chaining.
    ///
    /// # Errors
    ///
    /// See [`MemorySource::insert_file`].
    pub fn with_file(
        mut self,
        path: &str,
        contents: impl Into<Vec<u8>>,
    ) -> Result<Self, InvalidTemplatePath> {
        self.insert_file(path, contents)?;
        Ok(self)
    }

    /// Add an empty directory, returning the tree for chaining.
    ///
    /// # Errors
    ///
    /// See [`MemorySource::insert_dir`].
    pub fn with_dir(mut self, path: &str) -> Result<Self, InvalidTemplatePath> {
        self.insert_dir(path)?;
        Ok(self)
    }

    /// Add a file and all of its ancestor directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid, is the root, or collides
    /// with an existing directory or with a file used as an ancestor.
    pub fn insert_file(
        &mut self,
        path: &str,
        contents: impl Into<Vec<u8>>,
    ) -> Result<(), InvalidTemplatePath> {
        let path = TemplatePath::parse(path)?;
        if path.is_root() || self.directories.contains(&path) {
            return Err(InvalidTemplatePath::Conflict(path.to_string()));
        }
        self.insert_ancestors(&path)?;
        self.files.insert(path, contents.into());
        Ok(())
    }

    /// Add a directory and all of its ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or collides with a file.
    pub fn insert_dir(&mut self, path: &str) -> Result<(), InvalidTemplatePath> {
        let path = TemplatePath::parse(path)?;
        if path.is_root() {
            return Ok(());
        }
        if self.files.contains_key(&path) {
            return Err(InvalidTemplatePath::Conflict(path.to_string()));
        }
        self.insert_ancestors(&path)?;
        self.directories.insert(path);
        Ok(())
    }

    fn insert_ancestors(&mut self, path: &TemplatePath) -> Result<(), InvalidTemplatePath> {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.is_root() {
                break;
            }
            if self.files.contains_key(&dir) {
                return Err(InvalidTemplatePath::Conflict(dir.to_string()));
            }
            current = dir.parent();
            self.directories.insert(dir);
        }
        Ok(())
    }

    /// Number of files in the tree
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn is_dir(&self, path: &TemplatePath) -> bool {
        path.is_root() || self.directories.contains(path)
    }
}

impl TemplateSource for MemorySource {
    fn list(&self, dir: &TemplatePath) -> io::Result<Vec<TemplateEntry>> {
        if !self.is_dir(dir) {
            let kind = if self.files.contains_key(dir) {
                io::ErrorKind::NotADirectory
            } else {
                io::ErrorKind::NotFound
            };
            return Err(io::Error::new(kind, format!("no template directory '{dir}'")));
        }

        let is_child = |path: &TemplatePath| path.parent().as_ref() == Some(dir);

        let directories = self
            .directories
            .iter()
            .filter(|&path| is_child(path))
            .cloned()
            .map(TemplateEntry::directory);
        let files = self
            .files
            .keys()
            .filter(|&path| is_child(path))
            .cloned()
            .map(TemplateEntry::file);

        let mut entries: Vec<_> = directories.chain(files).collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read(&self, file: &TemplatePath) -> io::Result<Cow<'_, [u8]>> {
        self.files
            .get(file)
            .map(|contents| Cow::Borrowed(contents.as_slice()))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no template file '{file}'"))
            })
    }

    fn describe(&self) -> String {
        format!("in-memory template ({} files)", self.files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EntryKind;

    #[test]
    fn test_ancestors_become_directories() {
        let source = MemorySource::new().with_file("a/b/c.txt", "c").unwrap();

        let root = source.list(&TemplatePath::root()).unwrap();
        assert_eq!(root, vec![TemplateEntry::directory(TemplatePath::parse("a").unwrap())]);

        let b = source.list(&TemplatePath::parse("a/b").unwrap()).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].kind, EntryKind::File);
        assert_eq!(b[0].path.as_str(), "a/b/c.txt");
    }

    #[test]
    fn test_empty_directory_is_listed() {
        let source = MemorySource::new().with_dir("static").unwrap();
        let root = source.list(&TemplatePath::root()).unwrap();
        assert_eq!(root.len(), 1);
        assert!(root[0].is_dir());
        assert!(source.list(&root[0].path).unwrap().is_empty());
    }

    #[test]
    fn test_conflicts_rejected() {
        let mut source = MemorySource::new().with_file("a", "file").unwrap();
        assert!(source.insert_file("a/b", "x").is_err());
        assert!(source.insert_dir("a").is_err());

        let mut source = MemorySource::new().with_dir("d").unwrap();
        assert!(source.insert_file("d", "x").is_err());
        assert!(source.insert_file("", "x").is_err());
    }

    #[test]
    fn test_read() {
        let source = MemorySource::new().with_file("x.txt", "hello").unwrap();
        let path = TemplatePath::parse("x.txt").unwrap();
        assert_eq!(source.read(&path).unwrap().as_ref(), b"hello");

        let missing = TemplatePath::parse("y.txt").unwrap();
        assert_eq!(source.read(&missing).unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_listing_a_file_fails() {
        let source = MemorySource::new().with_file("x.txt", "hello").unwrap();
        let path = TemplatePath::parse("x.txt").unwrap();
        assert!(source.list(&path).is_err());
    }
}
