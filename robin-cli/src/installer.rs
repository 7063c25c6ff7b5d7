//! Dependency installation
//!
//! After the app is generated, the first package manager found on `PATH`
//! from an ordered preference list runs `install` inside the new app. If none
//! of the preferred ones is found the fallback is used. A missing fallback is
//! not skipped: launching it fails and the run reports an install error.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::{ScaffoldError, ScaffoldResult};

/// Subcommand every supported package manager understands
const INSTALL_SUBCOMMAND: &str = "install";

/// Locates executables on the host
pub trait ExecutableProbe {
    /// Full path of `program`, or `None` if it is not available.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Searches `PATH` like a shell would
#[derive(Debug, Clone, Copy, Default)]
pub struct PathProbe;

impl ExecutableProbe for PathProbe {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

impl<F> ExecutableProbe for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self(program)
    }
}

/// Package manager preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Package managers to try, most preferred first
    pub preferred: Vec<String>,

    /// Package manager used when none of the preferred ones is available
    pub fallback: String,

    /// Do not install dependencies at all
    pub skip: bool,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            preferred: vec!["yarn".to_string()],
            fallback: "npm".to_string(),
            skip: false,
        }
    }
}

/// The package manager picked for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerChoice {
    /// Program name as configured
    pub program: String,
    /// What gets executed, the resolved path when the probe found one
    pub executable: PathBuf,
    /// Whether this is the fallback
    pub fallback: bool,
}

/// Selects and runs a package manager
#[derive(Debug, Clone)]
pub struct Installer<P = PathProbe> {
    preferred: Vec<String>,
    fallback: String,
    probe: P,
}

impl Installer<PathProbe> {
    /// Installer probing the real `PATH`
    #[must_use]
    pub fn from_settings(settings: &InstallerSettings) -> Self {
        Self::with_probe(settings, PathProbe)
    }
}

impl<P: ExecutableProbe> Installer<P> {
    /// Installer using a custom probe
    pub fn with_probe(settings: &InstallerSettings, probe: P) -> Self {
        Self {
            preferred: settings.preferred.clone(),
            fallback: settings.fallback.clone(),
            probe,
        }
    }

    /// Pick the first available preferred package manager, else the fallback.
    #[must_use]
    pub fn select(&self) -> InstallerChoice {
        for program in &self.preferred {
            if let Some(executable) = self.probe.locate(program) {
                tracing::debug!(%program, path = %executable.display(), "found package manager");
                return InstallerChoice {
                    program: program.clone(),
                    executable,
                    fallback: false,
                };
            }
            tracing::debug!(%program, "package manager not found");
        }

        let executable = self
            .probe
            .locate(&self.fallback)
            .unwrap_or_else(|| PathBuf::from(&self.fallback));
        InstallerChoice {
            program: self.fallback.clone(),
            executable,
            fallback: true,
        }
    }

    /// Run `<package manager> install` in `app_dir`.
    ///
    /// Output goes straight to this process's stdout and stderr. Blocks
    /// until the package manager exits.
    ///
    /// # Errors
    ///
    /// - [`ScaffoldError::Install`] if the package manager cannot be launched
    /// - [`ScaffoldError::InstallExit`] if it exits unsuccessfully
    pub fn install(&self, app_dir: &Path) -> ScaffoldResult<InstallerChoice> {
        let choice = self.select();
        run_install(&choice, app_dir)?;
        Ok(choice)
    }
}

fn run_install(choice: &InstallerChoice, app_dir: &Path) -> ScaffoldResult<()> {
    tracing::info!(
        program = %choice.program,
        fallback = choice.fallback,
        dir = %app_dir.display(),
        "installing dependencies"
    );

    let mut child = Command::new(&choice.executable)
        .arg(INSTALL_SUBCOMMAND)
        .current_dir(app_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| ScaffoldError::Install {
            program: choice.program.clone(),
            source,
        })?;

    let status = child.wait().map_err(|source| ScaffoldError::Install {
        program: choice.program.clone(),
        source,
    })?;

    if !status.success() {
        return Err(ScaffoldError::InstallExit {
            program: choice.program.clone(),
            status,
        });
    }

    Ok(())
}
