//! Configuration for the robin CLI
//!
//! Settings are merged from several sources, later ones winning:
//!
//! 1. Hardcoded defaults
//! 2. `~/.config/robin/config.toml` (user config, XDG)
//! 3. `./robin.toml`
//! 4. Environment variables (`ROBIN_` prefix, `__` for nesting)
//!
//! Command-line flags override all of them.
//!
//! # Example Configuration
//!
//! ```toml
//! [installer]
//! preferred = ["pnpm", "yarn"]
//! fallback = "npm"
//! skip = false
//!
//! [template]
//! dir = "/home/me/robin-templates/app"
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::installer::InstallerSettings;

/// Template selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Template directory on disk; the bundled template is used when unset
    pub dir: Option<PathBuf>,
}

/// Complete robin CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobinConfig {
    /// Package manager settings
    #[serde(default)]
    pub installer: InstallerSettings,

    /// Template settings
    #[serde(default)]
    pub template: TemplateSettings,
}

impl RobinConfig {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file contains invalid TOML
    /// - A value has the wrong type
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Self::defaults()?;

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                figment = figment.merge(Toml::file(&user_config));
            }
        }

        let local_config = PathBuf::from("./robin.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Self::env());

        Ok(figment.extract()?)
    }

    /// Load configuration from a specific file, still honoring the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or a value has
    /// the wrong type.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config = Self::defaults()?
            .merge(Toml::file(path))
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    /// XDG location of the user configuration file
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("robin").join("config.toml"))
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }

    fn env() -> Env {
        Env::prefixed("ROBIN_").split("__").lowercase(true)
    }
}
