//! Project configuration from `kettle.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One file per [section]
//! │   ├── dev        # [dev]
//! │   ├── project    # [project]
//! │   ├── sandbox    # [sandbox]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! ├── util           # Config file discovery
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! The config file is optional: a project with no `kettle.toml` runs on
//! defaults, rooted at the working directory.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{DevConfig, ProjectConfig, SandboxConfig, ServeConfig, WatchConfig};

use crate::{
    cli::{Cli, Commands},
    core::RunMode,
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Root configuration structure representing kettle.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file, whether or not it exists
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub dev: DevConfig,

    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl AppConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// With an explicit project root the config is looked up there only;
    /// otherwise the search walks upward from the working directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (root, config_path) = match cli.root() {
            Some(root) => {
                let root = crate::utils::path::normalize_path(root);
                if !root.is_dir() {
                    return Err(ConfigError::Validation(format!(
                        "project root `{}` is not a directory",
                        root.display()
                    ))
                    .into());
                }
                let config_path = root.join(&cli.config);
                (root, config_path)
            }
            None => match find_config_file(&cli.config, &cwd) {
                Some(path) => {
                    let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                    (root, path)
                }
                None => (cwd.clone(), cwd.join(&cli.config)),
            },
        };

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            debug!("config"; "no {} found, using defaults", config_path.display());
            Self::default()
        };

        config.config_path = config_path;
        config.root = root;
        config.apply_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Commands::Serve {
            interface,
            port,
            production,
            ..
        } = &cli.command
        {
            if let Some(interface) = interface {
                self.serve.interface = *interface;
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
            if *production {
                self.project.production = true;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.workers == 0 {
            return Err(ConfigError::Validation("serve.workers must be at least 1".into()));
        }
        for (field, value) in [
            ("dev.socket_path", &self.dev.socket_path),
            ("dev.ping_path", &self.dev.ping_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "{field} must start with `/`, got `{value}`"
                )));
            }
        }
        if self.dev.socket_path == self.dev.ping_path {
            return Err(ConfigError::Validation(
                "dev.socket_path and dev.ping_path must differ".into(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // derived paths
    // ========================================================================

    /// Base source directory that routes are derived from.
    ///
    /// `[project] source` if set, else `<root>/src` when it exists, else the root.
    pub fn source_dir(&self) -> PathBuf {
        if let Some(source) = &self.project.source {
            return self.root.join(source);
        }
        let src = self.root.join("src");
        if src.is_dir() { src } else { self.root.clone() }
    }

    /// Seed file for the data store, under `<source>/.db`.
    pub fn store_seed(&self) -> Option<PathBuf> {
        let name = self.project.store.as_deref()?;
        Some(self.source_dir().join(".db").join(name))
    }

    pub fn run_mode(&self) -> RunMode {
        RunMode::from_production_flag(self.project.production)
    }

    /// Whether error documents carry stack detail.
    pub fn show_stack(&self) -> bool {
        self.dev.show_stack && self.run_mode().is_development()
    }
}

#[cfg(test)]
pub fn test_parse_config(extra: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_at(root: &Path) -> AppConfig {
        AppConfig {
            root: root.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            AppConfig::parse_with_ignored("[serve]\nport = 1\nbogus = true\n[extra]\nx = 1").unwrap();
        assert!(ignored.iter().any(|f| f.contains("bogus")));
        assert!(ignored.iter().any(|f| f.contains("extra")));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AppConfig::from_str("[serve\nport = 1").is_err());
    }

    #[test]
    fn test_source_dir_prefers_src() {
        let temp = TempDir::new().unwrap();
        let config = config_at(temp.path());
        assert_eq!(config.source_dir(), temp.path());

        std::fs::create_dir(temp.path().join("src")).unwrap();
        assert_eq!(config.source_dir(), temp.path().join("src"));
    }

    #[test]
    fn test_source_dir_explicit() {
        let temp = TempDir::new().unwrap();
        let mut config = config_at(temp.path());
        config.project.source = Some(PathBuf::from("app"));
        assert_eq!(config.source_dir(), temp.path().join("app"));
    }

    #[test]
    fn test_store_seed_under_db_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = config_at(temp.path());
        assert!(config.store_seed().is_none());
        config.project.store = Some(PathBuf::from("seed.json"));
        assert_eq!(
            config.store_seed(),
            Some(temp.path().join(".db").join("seed.json"))
        );
    }

    #[test]
    fn test_show_stack_suppressed_in_production() {
        let mut config = test_parse_config("");
        assert!(config.show_stack());
        config.project.production = true;
        assert!(!config.show_stack());
        assert_eq!(config.run_mode(), RunMode::Production);
    }

    #[test]
    fn test_validate_paths() {
        let mut config = test_parse_config("");
        assert!(config.validate().is_ok());

        config.dev.ping_path = "ping".into();
        assert!(config.validate().is_err());

        config.dev.ping_path = config.dev.socket_path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_workers() {
        let config = test_parse_config("[serve]\nworkers = 0");
        assert!(config.validate().is_err());
    }
}
