use crate::error::{CabinetError, Result};
use crate::validation::RuleSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILENAME: &str = "cabinet.json";
const DEFAULT_DATA_FILE: &str = "cabinet.db";

/// Which backend holds the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    #[default]
    File,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::File => f.write_str("file"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File),
            other => Err(CabinetError::Config(format!(
                "unknown storage '{}' (expected 'memory' or 'file')",
                other
            ))),
        }
    }
}

/// Configuration for the cabinet, stored in `cabinet.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CabinetConfig {
    #[serde(default)]
    pub storage: StorageKind,

    /// Slot file for the file backend. Relative paths resolve against the
    /// directory the config was loaded from.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    #[serde(default)]
    pub validation_rules: RuleSet,

    /// JSON file with `default` and `custom` rule sections. Presets are used
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,

    #[serde(default)]
    pub use_stopwatch: bool,

    #[serde(default)]
    pub use_logger: bool,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

impl Default for CabinetConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            data_file: default_data_file(),
            validation_rules: RuleSet::default(),
            rules_file: None,
            use_stopwatch: false,
            use_logger: false,
        }
    }
}

impl CabinetConfig {
    /// Load config from the given directory, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(CabinetError::Io)?;
            serde_json::from_str(&content).map_err(CabinetError::Serialization)?
        } else {
            Self::default()
        };
        config.rebase(config_dir);
        Ok(config)
    }

    /// Save config to the given directory.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(CabinetError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(CabinetError::Serialization)?;
        fs::write(config_path, content).map_err(CabinetError::Io)?;
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        &self.data_file
    }

    fn rebase(&mut self, dir: &Path) {
        if self.data_file.is_relative() {
            self.data_file = dir.join(&self.data_file);
        }
        if let Some(rules) = self.rules_file.as_mut().filter(|p| p.is_relative()) {
            *rules = dir.join(&*rules);
        }
    }
}
