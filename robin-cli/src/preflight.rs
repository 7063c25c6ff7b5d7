//! Target path checks
//!
//! The check and the later creation are two separate filesystem calls, so
//! another process can still create the target in between. [`create_root`]
//! narrows that window by creating the target non-recursively, which fails
//! if the directory appeared after [`ensure_absent`] succeeded.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ScaffoldError, ScaffoldResult};

/// Fail unless nothing exists at `target`.
///
/// Dangling symbolic links count as existing.
///
/// # Errors
///
/// - [`ScaffoldError::TargetExists`] if the path is occupied
/// - [`ScaffoldError::TargetCheck`] if existence cannot be determined
pub fn ensure_absent(target: &Path) -> ScaffoldResult<()> {
    match fs::symlink_metadata(target) {
        Ok(_) => Err(ScaffoldError::TargetExists {
            path: target.to_path_buf(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ScaffoldError::TargetCheck {
            path: target.to_path_buf(),
            source,
        }),
    }
}

/// Create the target directory and any missing ancestors.
///
/// # Errors
///
/// - [`ScaffoldError::TargetExists`] if the target appeared since the check
/// - [`ScaffoldError::TargetCreate`] if a directory cannot be created
pub fn create_root(target: &Path) -> ScaffoldResult<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| ScaffoldError::TargetCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::create_dir(target).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            ScaffoldError::TargetExists {
                path: target.to_path_buf(),
            }
        } else {
            ScaffoldError::TargetCreate {
                path: target.to_path_buf(),
                source,
            }
        }
    })
}
