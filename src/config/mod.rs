//! Configuration management for `toc.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[build]`   | Input/output directories, minification           |
//! | `[toc]`     | Qualifying headings, opt-out classes, strategy   |
//! | `[scroll]`  | Clearance, visibility margins, throttle interval |
//! | `[drawer]`  | Settle delay, swipe threshold, progress ring     |
//! | `[labels]`  | Fallback accessibility strings                   |
//!
//! # Example
//!
//! ```toml
//! [build]
//! input = "public"
//! output = "dist"
//!
//! [toc]
//! levels = [2, 3]
//!
//! [scroll]
//! clearance = 80.0
//!
//! [labels]
//! on_this_page = "Contents"
//! ```

mod build;
pub mod defaults;
mod drawer;
mod error;
mod labels;
mod scroll;
mod toc;

pub use build::BuildConfig;
pub use drawer::DrawerConfig;
pub use error::ConfigError;
pub use labels::LabelsConfig;
pub use scroll::ScrollConfig;
pub use toc::{Strategy, TocConfig};

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing toc.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct TocbarConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site rewriting settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Heading extraction settings
    #[serde(default)]
    pub toc: TocConfig,

    /// Scroll tracker settings
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// Mobile drawer settings
    #[serde(default)]
    pub drawer: DrawerConfig,

    /// Fallback labels
    #[serde(default)]
    pub labels: LabelsConfig,
}

impl TocbarConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: TocbarConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = Self::normalize_path(&root);
        self.set_root(&root);
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        if let Commands::Build {
            input,
            output,
            minify,
        } = &cli.command
        {
            Self::update_option(&mut self.build.input, input.as_ref());
            Self::update_option(&mut self.build.output, output.as_ref());
            Self::update_option(&mut self.build.minify, minify.as_ref());
        }

        self.build.input = Self::normalize_path(&root.join(&self.build.input));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values.
    ///
    /// Directory checks only apply when a `build` command is attached.
    pub fn validate(&self) -> Result<()> {
        if self.toc.min_headings == 0 {
            bail!(ConfigError::Validation(
                "[toc.min_headings] must be at least 1".into()
            ));
        }

        if self.toc.levels.is_empty() {
            bail!(ConfigError::Validation(
                "[toc.levels] must not be empty".into()
            ));
        }

        if let Some(level) = self.toc.levels.iter().find(|l| !(1..=6).contains(*l)) {
            bail!(ConfigError::Validation(format!(
                "[toc.levels] contains {level}, expected 1..=6"
            )));
        }

        if self.toc.slug_max_len == 0 {
            bail!(ConfigError::Validation(
                "[toc.slug_max_len] must be at least 1".into()
            ));
        }

        if self.drawer.ring_radius <= 0.0 {
            bail!(ConfigError::Validation(
                "[drawer.ring_radius] must be positive".into()
            ));
        }

        if self.cli.is_some_and(Cli::is_build) {
            let input = &self.build.input;
            if !input.exists() {
                bail!(ConfigError::Validation(format!(
                    "[build.input] `{}` not found",
                    input.display()
                )));
            }
            if !input.is_dir() {
                bail!(ConfigError::Validation(format!(
                    "[build.input] `{}` is not a directory",
                    input.display()
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
