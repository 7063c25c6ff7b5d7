//! Template directory on disk

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{TemplateEntry, TemplatePath, TemplateSource};
use crate::error::{ScaffoldError, ScaffoldResult};

/// Template tree read from a directory on disk
///
/// Symbolic links are followed, so a linked directory is materialized as a
/// real directory in the generated app.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Use `root` as the template root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `root` as the template root after checking that it is a
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::TemplateUnavailable`] if `root` is missing,
    /// unreadable or not a directory.
    pub fn open(root: impl Into<PathBuf>) -> ScaffoldResult<Self> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => Ok(Self::new(root)),
            Ok(_) => Err(ScaffoldError::TemplateUnavailable {
                path: root,
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            }),
            Err(source) => Err(ScaffoldError::TemplateUnavailable { path: root, source }),
        }
    }

    /// Template root on disk
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &TemplatePath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |resolved, segment| resolved.join(segment))
    }
}

impl TemplateSource for DirSource {
    fn list(&self, dir: &TemplatePath) -> io::Result<Vec<TemplateEntry>> {
        let walker = WalkDir::new(self.resolve(dir))
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            let name = entry.file_name().to_str().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("non UTF-8 file name: {}", entry.path().display()),
                )
            })?;
            let path = dir
                .join(name)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

            entries.push(if entry.file_type().is_dir() {
                TemplateEntry::directory(path)
            } else {
                TemplateEntry::file(path)
            });
        }

        Ok(entries)
    }

    fn read(&self, file: &TemplatePath) -> io::Result<Cow<'_, [u8]>> {
        fs::read(self.resolve(file)).map(Cow::Owned)
    }

    fn describe(&self) -> String {
        format!("template directory {}", self.root.display())
    }
}
