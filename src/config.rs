//! Configuration for package loading and remote lookup.
//!
//! Settings are layered:
//! - Default values
//! - `wrapgen.toml` in the current directory or the nearest ancestor
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `WRAPGEN_` and use double
//! underscores to separate nested levels:
//! - `WRAPGEN_LOADER__INCLUDE_TESTS=true` sets `loader.include_tests`
//! - `WRAPGEN_LOOKUP__GO_ROOT=/usr/local/go` sets `lookup.go_root`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`Settings::load`].
pub const CONFIG_FILE_NAME: &str = "wrapgen.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Package loading
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Where imported packages are looked up
    #[serde(default)]
    pub lookup: LookupConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct LoaderConfig {
    /// Also load the package's own `_test.go` files
    #[serde(default)]
    pub include_tests: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct LookupConfig {
    /// Go installation root; falls back to `$GOROOT` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_root: Option<PathBuf>,

    /// Extra source roots laid out by import path (`<root>/<import/path>`).
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

impl LookupConfig {
    /// Source roots in lookup order: the standard library first.
    pub fn roots(&self) -> Vec<PathBuf> {
        let go_root = self
            .go_root
            .clone()
            .or_else(|| std::env::var_os("GOROOT").map(PathBuf::from));

        go_root
            .map(|root| root.join("src"))
            .into_iter()
            .chain(self.search_paths.iter().cloned())
            .collect()
    }
}

fn default_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            loader: LoaderConfig::default(),
            lookup: LookupConfig::default(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path =
            Self::find_config_file().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // `__` separates nested levels, single `_` stays part of the key
            .merge(Env::prefixed("WRAPGEN_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Nearest `wrapgen.toml`, searching from the current directory up to root
    fn find_config_file() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}
