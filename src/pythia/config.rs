use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_FILE_MODE: u32 = 0o600;

/// Store configuration, kept in `<root>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory for answer documents, relative to the data root
    #[serde(default = "default_answers_dir")]
    pub answers_dir: String,

    /// Directory for user documents, relative to the data root
    #[serde(default = "default_users_dir")]
    pub users_dir: String,

    /// Unix permission bits for every document written
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,

    /// Pretty-print documents
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_answers_dir() -> String {
    "answers".to_string()
}

fn default_users_dir() -> String {
    "users".to_string()
}

fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

fn default_pretty() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            answers_dir: default_answers_dir(),
            users_dir: default_users_dir(),
            file_mode: DEFAULT_FILE_MODE,
            pretty: true,
        }
    }
}

impl StoreConfig {
    /// Load config from the data root, or return defaults if there is none
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let config_path = root.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read(&config_path).map_err(|e| StoreError::io(&config_path, e))?;
        let config: StoreConfig =
            serde_json::from_slice(&content).map_err(|e| StoreError::encoding(&config_path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, root: P) -> Result<()> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|e| StoreError::io(root, e))?;

        let config_path = root.join(CONFIG_FILENAME);
        let content =
            serde_json::to_string_pretty(self).map_err(|e| StoreError::encoding(&config_path, e))?;
        fs::write(&config_path, content).map_err(|e| StoreError::io(&config_path, e))?;
        Ok(())
    }

    /// Collection directories must be distinct plain names under the root.
    pub fn validate(&self) -> Result<()> {
        for dir in [&self.answers_dir, &self.users_dir] {
            let plain = !dir.is_empty()
                && !dir.contains(['/', '\\'])
                && dir != "."
                && dir != "..";
            if !plain {
                return Err(StoreError::Config(format!(
                    "collection directory must be a plain name, got {dir:?}"
                )));
            }
        }
        if self.answers_dir == self.users_dir {
            return Err(StoreError::Config(
                "answers and users cannot share a directory".to_string(),
            ));
        }
        if self.file_mode & 0o600 != 0o600 || self.file_mode > 0o777 {
            return Err(StoreError::Config(format!(
                "file_mode {:o} must be owner read/write permission bits",
                self.file_mode
            )));
        }
        Ok(())
    }
}
