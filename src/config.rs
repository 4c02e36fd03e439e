//! Contains the system configuration.
//!
//! The configuration is loaded from **config/settings.yml** (unless another file is given). If
//! the file doesn't exist, all settings keep their defaults. Values are addressed by dotted
//! paths like `loader.batch_size`.
//!
//! # Example
//! ```
//! # use opac::config::Config;
//! let mut config = Config::new("settings.yml");
//! config.load_from_string("
//! loader:
//!     batch_size: 250
//! database:
//!     file: data/catalog.json
//! ").unwrap();
//!
//! assert_eq!(config.query("loader.batch_size").as_i64(), Some(250));
//!
//! let settings = config.settings();
//! assert_eq!(settings.loader.batch_size, 250);
//! assert_eq!(settings.loader.max_logged_rejections, 10);
//! assert_eq!(settings.search.per_page, 20);
//! assert_eq!(settings.database.file.unwrap().to_str(), Some("data/catalog.json"));
//! ```
use crate::dcndl::loader::DEFAULT_MAX_LOGGED_REJECTIONS;
use crate::store::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use std::path::PathBuf;
use yaml_rust::{Yaml, YamlLoader};

/// Contains the default location of the config file.
pub const DEFAULT_CONFIG_FILE: &str = "config/settings.yml";

/// Contains the directory scanned for XML files unless configured otherwise.
pub const DEFAULT_DATA_DIR: &str = "init_data";

/// Contains the number of records stored per commit unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Provides access to the YAML configuration.
pub struct Config {
    filename: String,
    root: Yaml,
}

/// Contains the settings of the catalog.
#[derive(Debug, Clone, Default)]
pub struct DatabaseSettings {
    /// The location of the JSON snapshot. If absent, the catalog isn't persisted.
    pub file: Option<PathBuf>,
}

/// Contains the settings used when populating the catalog.
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    /// The directory containing the XML files.
    pub data_dir: PathBuf,

    /// The number of records stored per commit.
    pub batch_size: usize,

    /// The number of rejected records which are logged per file.
    pub max_logged_rejections: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        LoaderSettings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            batch_size: DEFAULT_BATCH_SIZE,
            max_logged_rejections: DEFAULT_MAX_LOGGED_REJECTIONS,
        }
    }
}

/// Contains the settings of the search.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// The default number of items per page.
    pub per_page: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Contains all settings in a typed form.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub loader: LoaderSettings,
    pub search: SearchSettings,
}

impl Config {
    /// Creates a new and empty config which will read the given file.
    pub fn new(file: &str) -> Self {
        Config {
            filename: file.to_owned(),
            root: Yaml::Null,
        }
    }

    /// Returns the name of the underlying file.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Reads the underlying file.
    ///
    /// A missing file isn't an error. In this case the config remains empty and all settings
    /// use their defaults.
    pub async fn load(&mut self) -> anyhow::Result<()> {
        match tokio::fs::metadata(&self.filename).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => {
                log::info!(
                    "Config file {} doesn't exist - using the defaults.",
                    &self.filename
                );
                return Ok(());
            }
        }

        log::info!("Loading config file {}...", &self.filename);
        let config_data = match tokio::fs::read_to_string(&self.filename).await {
            Ok(data) => data,
            Err(error) => {
                return Err(anyhow::anyhow!(
                    "Cannot load config file {}: {}",
                    &self.filename,
                    error
                ));
            }
        };

        self.load_from_string(config_data.as_str())
    }

    /// Loads a configuration from the given string instead of a file.
    pub fn load_from_string(&mut self, data: &str) -> anyhow::Result<()> {
        let mut docs = match YamlLoader::load_from_str(data) {
            Ok(docs) => docs,
            Err(error) => {
                return Err(anyhow::anyhow!(
                    "Cannot parse config file {}: {}",
                    &self.filename,
                    error
                ));
            }
        };

        self.root = if docs.is_empty() {
            Yaml::Null
        } else {
            docs.swap_remove(0)
        };

        Ok(())
    }

    /// Reads the value at the given dotted path.
    ///
    /// Returns `Yaml::BadValue` if there is no such value.
    pub fn query(&self, path: &str) -> &Yaml {
        path.split('.').fold(&self.root, |node, key| &node[key])
    }

    fn query_usize(&self, path: &str) -> Option<usize> {
        let value = self.query(path).as_i64()?;
        if value < 1 {
            log::warn!(
                "Ignoring invalid value {} for {} in {}.",
                value,
                path,
                &self.filename
            );
            return None;
        }

        usize::try_from(value).ok()
    }

    /// Extracts all known settings, using the defaults for absent or invalid values.
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        let max_logged_rejections = self
            .query("loader.max_logged_rejections")
            .as_i64()
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(defaults.loader.max_logged_rejections);

        Settings {
            database: DatabaseSettings {
                file: self.query("database.file").as_str().map(PathBuf::from),
            },
            loader: LoaderSettings {
                data_dir: self
                    .query("loader.data_dir")
                    .as_str()
                    .map(PathBuf::from)
                    .unwrap_or(defaults.loader.data_dir),
                batch_size: self
                    .query_usize("loader.batch_size")
                    .unwrap_or(defaults.loader.batch_size),
                max_logged_rejections,
            },
            search: SearchSettings {
                per_page: self
                    .query_usize("search.per_page")
                    .map(|per_page| per_page.min(MAX_PER_PAGE))
                    .unwrap_or(defaults.search.per_page),
            },
        }
    }
}
