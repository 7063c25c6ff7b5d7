//! Output path planning

use std::path::{Path, PathBuf};

use crate::source::TemplatePath;

/// Output location of a template entry below `target_root`.
///
/// Each segment of the template path is joined separately so the result
/// uses the host separator. Returns `None` for the template root, which maps
/// onto `target_root` itself and is created by the preflight stage.
#[must_use]
pub fn output_path(target_root: &Path, template_path: &TemplatePath) -> Option<PathBuf> {
    if template_path.is_root() {
        return None;
    }

    Some(
        template_path
            .segments()
            .fold(target_root.to_path_buf(), |path, segment| path.join(segment)),
    )
}
