//! Loader configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. a JSON config file (`efload.json` in the working directory, or an explicit path)
//! 3. environment variables `EFLOAD_DATA_DIR`, `EFLOAD_STORE_DIR`, `EFLOAD_VERBOSE`
//! 4. command line flags, applied by the binary
//!
//! A config file is checked against the embedded JSON schema before it is applied.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::convert::ConversionTables;
use crate::error::{ConfigError, ConfigResult, ExtractResult};
use crate::extract::NodePath;
use crate::models::DatasetKind;
use crate::validation::validate_config;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "efload.json";

pub const ENV_DATA_DIR: &str = "EFLOAD_DATA_DIR";
pub const ENV_STORE_DIR: &str = "EFLOAD_STORE_DIR";
pub const ENV_VERBOSE: &str = "EFLOAD_VERBOSE";

/// Where and whether to load one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: DatasetKind,
    /// XML file, relative to the data directory unless absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Node path selecting the records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl DatasetSpec {
    pub fn new(name: DatasetKind) -> Self {
        Self {
            name,
            file: None,
            path: None,
            enabled: true,
        }
    }

    /// XML file name, falling back to the dataset's default.
    pub fn file_name(&self) -> Option<&str> {
        self.file
            .as_deref()
            .or_else(|| self.name.default_source().map(|(file, _)| file))
    }

    /// Compiled node path, falling back to the dataset's default.
    pub fn node_path(&self) -> Option<ExtractResult<NodePath>> {
        self.path
            .as_deref()
            .or_else(|| self.name.default_source().map(|(_, path)| path))
            .map(NodePath::parse)
    }
}

/// Complete loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory holding the XML books
    pub data_dir: PathBuf,
    /// Directory of the JSON store
    pub store_dir: PathBuf,
    /// Emit debug log entries
    pub verbose: bool,
    /// Dataset plan, in load order
    pub datasets: Vec<DatasetSpec>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_dir: PathBuf::from(".efload/store"),
            verbose: false,
            datasets: DatasetKind::LOAD_ORDER.into_iter().map(DatasetSpec::new).collect(),
        }
    }
}

/// Shape of a config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    store_dir: Option<PathBuf>,
    verbose: Option<bool>,
    #[serde(default)]
    datasets: Vec<DatasetSpec>,
}

impl LoaderConfig {
    /// Defaults, then the config file, then the process environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::default();

        match path {
            Some(path) => config.apply_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    config.apply_file(default)?;
                }
            }
        }

        config.apply_vars(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply a JSON config file.
    pub fn apply_file(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        self.apply_json(value)
    }

    /// Validate and apply a parsed config document.
    pub fn apply_json(&mut self, value: Value) -> ConfigResult<()> {
        validate_config(&value).map_err(|errors| ConfigError::Schema { errors })?;
        let file: ConfigFile = serde_json::from_value(value)?;

        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = file.store_dir {
            self.store_dir = dir;
        }
        if let Some(verbose) = file.verbose {
            self.verbose = verbose;
        }
        for spec in file.datasets {
            self.set_dataset(spec);
        }
        Ok(())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_STORE_DIR).filter(|v| !v.trim().is_empty()) {
            self.store_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_VERBOSE).filter(|v| !v.trim().is_empty()) {
            self.verbose = ConversionTables::new()
                .boolean_token(raw.trim())
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_VERBOSE.to_string(),
                    message: format!("'{}' is not a boolean", raw),
                })?;
        }
        Ok(())
    }

    /// Replace the spec with the same dataset name, or append it.
    pub fn set_dataset(&mut self, spec: DatasetSpec) {
        match self.datasets.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.datasets.push(spec),
        }
    }

    pub fn dataset(&self, kind: DatasetKind) -> Option<&DatasetSpec> {
        self.datasets.iter().find(|s| s.name == kind)
    }

    /// Enabled datasets, in load order.
    pub fn enabled_datasets(&self) -> Vec<&DatasetSpec> {
        DatasetKind::LOAD_ORDER
            .iter()
            .filter_map(|kind| self.dataset(*kind))
            .filter(|spec| spec.enabled)
            .collect()
    }

    /// Absolute or data-dir relative location of a dataset's XML file.
    pub fn source_file(&self, spec: &DatasetSpec) -> Option<PathBuf> {
        spec.file_name().map(|file| {
            let file = Path::new(file);
            if file.is_absolute() {
                file.to_path_buf()
            } else {
                self.data_dir.join(file)
            }
        })
    }
}
