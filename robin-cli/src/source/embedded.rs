//! App template bundled into the binary

use std::borrow::Cow;
use std::io;

use rust_embed::RustEmbed;

use super::{MemorySource, TemplateEntry, TemplatePath, TemplateSource};
use crate::error::{ScaffoldError, ScaffoldResult};

#[derive(RustEmbed)]
#[folder = "app-template/"]
struct AppTemplate;

/// The default robin app template, compiled into the binary
///
/// Embedded assets only carry files, so the directory tree is rebuilt from
/// the file paths. Empty directories cannot be bundled.
#[derive(Debug, Clone)]
pub struct EmbeddedSource {
    index: MemorySource,
}

impl EmbeddedSource {
    /// Index the bundled template.
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::TemplateWalk`] if a bundled path is invalid
    /// or a listed asset cannot be loaded.
    pub fn load() -> ScaffoldResult<Self> {
        let mut index = MemorySource::new();

        for name in AppTemplate::iter() {
            let asset = AppTemplate::get(&name).ok_or_else(|| ScaffoldError::TemplateWalk {
                path: TemplatePath::root(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("bundled template asset '{name}' is missing"),
                ),
            })?;

            index
                .insert_file(&name, asset.data.into_owned())
                .map_err(|err| ScaffoldError::TemplateWalk {
                    path: TemplatePath::root(),
                    source: io::Error::new(io::ErrorKind::InvalidData, err),
                })?;
        }

        tracing::debug!(files = index.file_count(), "indexed bundled app template");
        Ok(Self { index })
    }
}

impl TemplateSource for EmbeddedSource {
    fn list(&self, dir: &TemplatePath) -> io::Result<Vec<TemplateEntry>> {
        self.index.list(dir)
    }

    fn read(&self, file: &TemplatePath) -> io::Result<Cow<'_, [u8]>> {
        self.index.read(file)
    }

    fn describe(&self) -> String {
        "bundled app template".to_string()
    }
}
