//! Configuration for the record registry
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (registry.toml)
//! - Environment variables (REGISTRY__*)
//!
//! ## Example config file (registry.toml):
//! ```toml
//! [store]
//! path = "items.csv"
//! layout = "item"
//! header = true
//! delimiter = ","
//!
//! [sort]
//! algorithm = "quick"
//! order = "name"
//!
//! [files]
//! dir = "data"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::csv::CsvOptions;
use crate::layout::Layout;
use crate::record::RecordOrder;
use crate::sort::Algorithm;
use crate::store::CsvStore;

/// Main configuration for the record registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Record store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Sorting settings
    #[serde(default)]
    pub sort: SortConfig,

    /// Data files for the clinic, network and courses commands
    #[serde(default)]
    pub files: FilesConfig,
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the CSV data file
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Record kind stored in the file
    #[serde(default)]
    pub layout: Layout,

    /// Whether the file starts with a header row
    #[serde(default = "default_true")]
    pub header: bool,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Sorting configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortConfig {
    /// Algorithm for sorted listings and snapshots
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Default order for sorted listings
    #[serde(default)]
    pub order: RecordOrder,
}

/// Location of the per-kind data files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Directory holding one CSV file per record kind
    #[serde(default = "default_files_dir")]
    pub dir: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            dir: default_files_dir(),
        }
    }
}

// Default value functions
fn default_files_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_store_path() -> PathBuf {
    PathBuf::from("records.csv")
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            layout: Layout::default(),
            header: true,
            delimiter: default_delimiter(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["registry.toml", ".registry.toml", "config/registry.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "records", "registry") {
            let xdg_config = config_dir.config_dir().join("registry.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (REGISTRY__STORE__PATH, ...)
        builder = builder.add_source(
            Environment::with_prefix("REGISTRY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the store path (resolves relative paths)
    pub fn store_path(&self) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.store.path)
        }
    }

    /// CSV dialect for the store
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            delimiter: self.store.delimiter,
            header: self.store.header,
            ..CsvOptions::default()
        }
    }

    /// Build the configured CSV store
    pub fn open_store(&self) -> CsvStore {
        CsvStore::new(self.store_path(), self.store.layout).with_options(self.csv_options())
    }

    /// CSV store for one record kind inside the data directory
    pub fn store_for(&self, layout: Layout) -> CsvStore {
        CsvStore::new(self.files.dir.join(layout.file_name()), layout)
            .with_options(self.csv_options())
    }
}
