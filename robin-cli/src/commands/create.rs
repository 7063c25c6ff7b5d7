//! App creation command

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::RobinConfig;
use crate::context::{ContextBuilder, VariableContext};
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::installer::{Installer, InstallerChoice, InstallerSettings};
use crate::materialize::{Materializer, Summary};
use crate::preflight;
use crate::source::{DirSource, EmbeddedSource, TemplateSource};
use crate::stage::{Stage, StageTracker};

/// Result of a successful `create`
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    /// Absolute path of the new app
    pub path: PathBuf,
    /// Entries written
    pub summary: Summary,
    /// Package manager that installed dependencies, `None` when skipped
    pub installer: Option<InstallerChoice>,
}

/// Create a new robin app
#[derive(Debug, Clone)]
pub struct CreateCommand {
    target: PathBuf,
    template_dir: Option<PathBuf>,
    id: Option<String>,
    name: Option<String>,
    installer: InstallerSettings,
    quiet: bool,
}

impl CreateCommand {
    /// Create a command instance
    ///
    /// # Arguments
    ///
    /// * `target` - Path of the new app, relative paths resolve against the
    ///   current directory
    /// * `config` - Loaded configuration
    pub fn new(target: impl Into<PathBuf>, config: &RobinConfig) -> Self {
        Self {
            target: target.into(),
            template_dir: config.template.dir.clone(),
            id: None,
            name: None,
            installer: config.installer.clone(),
            quiet: false,
        }
    }

    /// Use a template directory on disk instead of the bundled template
    #[must_use]
    pub fn template_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.template_dir = dir;
        }
        self
    }

    /// Override the app identifier
    #[must_use]
    pub fn id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Override the app name
    #[must_use]
    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Skip dependency installation
    #[must_use]
    pub fn skip_install(mut self, skip: bool) -> Self {
        if skip {
            self.installer.skip = true;
        }
        self
    }

    /// Suppress the progress spinner and status lines
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Execute the command
    ///
    /// Nothing is cleaned up on failure. A partially generated app stays on
    /// disk and has to be removed before trying again.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage; see [`ScaffoldError::stage`].
    pub fn execute(&self) -> ScaffoldResult<CreateOutcome> {
        let mut stage = StageTracker::new();
        stage.advance(Stage::Validating);

        let result = self.run(&mut stage);
        match &result {
            Ok(outcome) => {
                stage.advance(Stage::Done);
                tracing::info!(path = %outcome.path.display(), "app created");
            }
            Err(err) => {
                tracing::error!(stage = %stage.current(), error = %err, "create failed");
                stage.fail();
            }
        }

        result
    }

    fn run(&self, stage: &mut StageTracker) -> ScaffoldResult<CreateOutcome> {
        let target = resolve_target(&self.target)?;
        let source = self.template_source()?;
        preflight::ensure_absent(&target)?;
        preflight::create_root(&target)?;

        stage.advance(Stage::Materializing);
        if !self.quiet {
            println!(
                "{} {} {}",
                style("Creating").green().bold(),
                style("robin app in").bold(),
                style(target.display()).cyan().bold()
            );
            println!();
        }

        let context = self.context_for(&target);
        let summary = self.materialize(source.as_ref(), &context, &target)?;

        stage.advance(Stage::Installing);
        let installer = if self.installer.skip {
            tracing::info!("dependency installation skipped");
            None
        } else {
            Some(Installer::from_settings(&self.installer).install(&target)?)
        };

        if !self.quiet {
            print_success(
                &target,
                &next_steps(&target, installer.as_ref(), &self.installer),
            );
        }

        Ok(CreateOutcome {
            path: target,
            summary,
            installer,
        })
    }

    fn template_source(&self) -> ScaffoldResult<Box<dyn TemplateSource>> {
        match &self.template_dir {
            Some(dir) => {
                let source = DirSource::open(dir)?;
                tracing::debug!(dir = %source.root().display(), "using template directory");
                Ok(Box::new(source))
            }
            None => Ok(Box::new(EmbeddedSource::load()?)),
        }
    }

    fn context_for(&self, target: &Path) -> VariableContext {
        let mut builder = ContextBuilder::for_target(target);
        if let Some(id) = &self.id {
            builder = builder.id(id);
        }
        if let Some(name) = &self.name {
            builder = builder.name(name);
        }
        builder.build()
    }

    fn materialize(
        &self,
        source: &dyn TemplateSource,
        context: &VariableContext,
        target: &Path,
    ) -> ScaffoldResult<Summary> {
        let spinner = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
        {
            spinner.set_style(spinner_style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Generating app files...");

        let result = Materializer::new(context)
            .and_then(|materializer| materializer.materialize(source, target));
        spinner.finish_and_clear();
        result
    }
}

/// Make `target` absolute and lexically clean.
fn resolve_target(target: &Path) -> ScaffoldResult<PathBuf> {
    let absolute = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| ScaffoldError::WorkingDir { source })?
            .join(target)
    };
    Ok(clean(&absolute))
}

fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pops past the root
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Commands the user runs next.
///
/// When installation was skipped the hint names the package manager that
/// would have been picked first by configuration.
fn next_steps(
    path: &Path,
    installer: Option<&InstallerChoice>,
    settings: &InstallerSettings,
) -> Vec<String> {
    let mut steps = vec![format!("cd {}", path.display())];
    match installer {
        Some(choice) => steps.push(format!("{} run dev", choice.program)),
        None => {
            let program = settings.preferred.first().unwrap_or(&settings.fallback);
            steps.push(format!("{program} install"));
            steps.push(format!("{program} run dev"));
        }
    }
    steps
}

/// Print success message with next steps
fn print_success(path: &Path, steps: &[String]) {
    println!(
        "{} {}",
        style("✓ Created new app in:").green().bold(),
        style(path.display()).cyan()
    );
    println!();
    println!("{}", style("Next steps:").bold());
    println!();
    for step in steps {
        println!("  {} {}", style("$").dim(), style(step).cyan());
    }
    println!();
}
