//! Tool configuration (`exemplar.config.json`).
//!
//! Points the CLI at the assets root (catalog + asset sources) and the base
//! template. A missing config file is not an error: defaults are used instead.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExemplarError, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "exemplar.config.json";

/// Default catalog file name, relative to the assets root.
pub const CATALOG_FILE: &str = "catalog.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemplarConfig {
    /// Directory holding the catalog and every asset it references.
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,
    /// Base project template copied in build mode.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
    /// Catalog file name, relative to `assets_root`.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,
}

fn default_assets_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("base-template")
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from(CATALOG_FILE)
}

impl Default for ExemplarConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            template_dir: default_template_dir(),
            catalog_file: default_catalog_file(),
        }
    }
}

impl ExemplarConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ExemplarError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        let mut config: Self =
            serde_json::from_str(&contents).map_err(|e| ExemplarError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        // Relative paths in the file are relative to the file, not the cwd.
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.assets_root = base.join(&config.assets_root);
            config.template_dir = base.join(&config.template_dir);
        }
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Full path of the catalog file.
    pub fn catalog_path(&self) -> PathBuf {
        self.assets_root.join(&self.catalog_file)
    }
}
