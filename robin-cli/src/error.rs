//! Scaffolding error types.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::source::TemplatePath;
use crate::stage::Stage;

/// Result type for scaffolding operations.
pub type ScaffoldResult<T> = Result<T, ScaffoldError>;

/// Errors that can occur while creating an app.
///
/// Every variant names the path or program it concerns. The underlying
/// cause is only reachable through [`std::error::Error::source`], so print
/// with `{:#}` through `anyhow` to get the whole chain on one line.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The current directory could not be resolved for a relative target.
    #[error("failed to get current working directory")]
    WorkingDir {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The target path is already occupied.
    #[error("target path already exists: {}", .path.display())]
    TargetExists {
        /// Target path.
        path: PathBuf,
    },

    /// Existence of the target path could not be determined.
    #[error("failed to check if target path exists: {}", .path.display())]
    TargetCheck {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The target directory could not be created.
    #[error("failed to create target directory {}", .path.display())]
    TargetCreate {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The template directory given on the command line or in the
    /// configuration is not a readable directory.
    #[error("template directory not found: {}", .path.display())]
    TemplateUnavailable {
        /// Template directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The template engine could not be configured.
    #[error("failed to configure template engine")]
    TemplateEngine {
        /// Template engine error.
        #[source]
        source: minijinja::Error,
    },

    /// Traversal of the template source failed.
    #[error("failed to walk template directory at '{path}'")]
    TemplateWalk {
        /// Template-relative path being visited.
        path: TemplatePath,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A template file is not UTF-8 text.
    #[error("template file '{path}' is not valid UTF-8")]
    TemplateEncoding {
        /// Template-relative path.
        path: TemplatePath,
        /// Decoding error.
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// A template file has a syntax error.
    #[error("failed to parse template file '{path}'")]
    TemplateParse {
        /// Template-relative path.
        path: TemplatePath,
        /// Template engine error.
        #[source]
        source: minijinja::Error,
    },

    /// A template file failed to render, usually an undefined placeholder.
    #[error("failed to execute template '{path}'")]
    TemplateRender {
        /// Template-relative path.
        path: TemplatePath,
        /// Template engine error.
        #[source]
        source: minijinja::Error,
    },

    /// Creating an output directory or writing an output file failed.
    #[error("failed to write {}", .path.display())]
    OutputWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The package manager could not be launched.
    #[error("failed to install dependencies: could not run '{program}'")]
    Install {
        /// Package manager program.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The package manager exited unsuccessfully.
    #[error("failed to install dependencies: '{program} install' exited with {status}")]
    InstallExit {
        /// Package manager program.
        program: String,
        /// Exit status of the subprocess.
        status: ExitStatus,
    },
}

impl ScaffoldError {
    /// Pipeline stage this error aborts.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::WorkingDir { .. }
            | Self::TargetExists { .. }
            | Self::TargetCheck { .. }
            | Self::TargetCreate { .. }
            | Self::TemplateUnavailable { .. } => Stage::Validating,
            Self::TemplateEngine { .. }
            | Self::TemplateWalk { .. }
            | Self::TemplateEncoding { .. }
            | Self::TemplateParse { .. }
            | Self::TemplateRender { .. }
            | Self::OutputWrite { .. } => Stage::Materializing,
            Self::Install { .. } | Self::InstallExit { .. } => Stage::Installing,
        }
    }

    /// Whether the user can recover by choosing a different target.
    #[must_use]
    pub const fn is_target_conflict(&self) -> bool {
        matches!(self, Self::TargetExists { .. })
    }
}
