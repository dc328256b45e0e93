//! Configuration loading for unback.
//!
//! Settings are layered, later layers winning:
//! 1. built-in defaults,
//! 2. a TOML file (`--config`, or `config.toml` in the user config directory),
//! 3. `UNBACK_*` environment variables,
//! 4. command-line flags.

pub mod error;

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use unback_device::INFO_FILENAME;
use unback_manifest::MANIFEST_FILENAME;

use crate::error::{ErrorKind, Result};

pub const CONFIG_FILENAME: &str = "config.toml";
pub const ENV_PREFIX: &str = "UNBACK_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backup directory (the one holding `Manifest.db`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Where the tree is rebuilt. Relative paths are resolved against the
    /// working directory.
    pub destination: PathBuf,
    /// Manifest file name, relative to `source`.
    pub manifest: PathBuf,
    /// Device metadata file name, relative to `source`.
    pub info: PathBuf,
    /// Resolve everything but write nothing.
    pub dry_run: bool,
    /// Fail the run if any record was skipped.
    pub strict: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            destination: PathBuf::from("_unback_"),
            manifest: PathBuf::from(MANIFEST_FILENAME),
            info: PathBuf::from(INFO_FILENAME),
            dry_run: false,
            strict: false,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit `config_file` must exist; the default user config file is
    /// optional.
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match config_file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path(),
        };
        Self::from_figment(layers(file.as_deref(), overrides))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(|err| ErrorKind::Invalid(err.to_string()))?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn source(&self) -> Result<&Path> {
        match &self.source {
            Some(source) => Ok(source),
            None => exn::bail!(ErrorKind::MissingSource),
        }
    }

    /// Full path of the manifest database.
    pub fn manifest_path(&self) -> Result<PathBuf> {
        Ok(self.source()?.join(&self.manifest))
    }

    /// Full path of the device metadata file.
    pub fn info_path(&self) -> Result<PathBuf> {
        Ok(self.source()?.join(&self.info))
    }
}

/// `config.toml` in the platform's user config directory, if there is one.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "unback").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn layers(file: Option<&Path>, overrides: &Overrides) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(file) = file {
        tracing::trace!(path = %file.display(), "reading config file");
        figment = figment.merge(Toml::file_exact(file));
    }
    figment.merge(Env::prefixed(ENV_PREFIX)).merge(Serialized::globals(overrides))
}
