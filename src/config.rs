use crate::error::{Result, SeekError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "seeklist.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub playable_list: PathBuf,
    pub unplayable_list: PathBuf,
    pub results_dir: PathBuf,
    pub drives: DriveRange,
    /// When non-empty, replaces drive probing entirely.
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DriveRange {
    pub first: char,
    pub last: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playable_list: PathBuf::from("_playable"),
            unplayable_list: PathBuf::from("_unplayable"),
            results_dir: PathBuf::from(".results"),
            drives: DriveRange::default(),
            roots: Vec::new(),
        }
    }
}

impl Default for DriveRange {
    fn default() -> Self {
        Self {
            first: 'D',
            last: 'Z',
        }
    }
}

impl DriveRange {
    /// Root prefixes such as `D:\`, upper-cased, in alphabetical order.
    pub fn root_prefixes(&self) -> Vec<PathBuf> {
        let first = self.first.to_ascii_uppercase();
        let last = self.last.to_ascii_uppercase();
        (first..=last)
            .filter(|letter| letter.is_ascii_alphabetic())
            .map(|letter| PathBuf::from(format!("{}:\\", letter)))
            .collect()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| SeekError::Configuration {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content)
            .map_err(|e| SeekError::ConfigFormat(format!("{}: {}", path.display(), e)))
    }
}
