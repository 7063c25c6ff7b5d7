//! robin CLI library
//!
//! Creates a new robin app from a template tree in three stages:
//!
//! 1. **Validating** - the target path must not exist yet ([`preflight`])
//! 2. **Materializing** - every template entry is rendered below the target
//!    ([`materialize`], fed by a [`source::TemplateSource`] and a
//!    [`context::VariableContext`])
//! 3. **Installing** - a package manager installs the app's dependencies
//!    ([`installer`])
//!
//! Any failure aborts the run. Nothing is rolled back.

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod installer;
pub mod materialize;
pub mod observability;
pub mod planner;
pub mod preflight;
pub mod source;
pub mod stage;

pub use commands::{CreateCommand, CreateOutcome};
pub use config::RobinConfig;
pub use context::{ContextBuilder, VariableContext};
pub use error::{ScaffoldError, ScaffoldResult};
pub use installer::{Installer, InstallerChoice, InstallerSettings};
pub use materialize::{Materializer, Summary};
pub use source::{DirSource, EmbeddedSource, MemorySource, TemplatePath, TemplateSource};
pub use stage::Stage;
