//! Playable / unplayable extension tables.
//!
//! Loaded once at startup from two line-oriented files and passed by
//! reference to whatever needs to route files into a playlist.

use crate::error::{Result, SeekError};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Playable,
    Unplayable,
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionTables {
    playable: HashSet<String>,
    unplayable: HashSet<String>,
}

impl ExtensionTables {
    pub fn new<P, U>(playable: P, unplayable: U) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        Self {
            playable: playable.into_iter().map(Into::into).collect(),
            unplayable: unplayable.into_iter().map(Into::into).collect(),
        }
    }

    pub fn load(playable_source: &Path, unplayable_source: &Path) -> Result<Self> {
        let tables = Self {
            playable: read_tokens(playable_source)?,
            unplayable: read_tokens(unplayable_source)?,
        };
        info!(
            "Loaded {} playable and {} unplayable extensions",
            tables.playable.len(),
            tables.unplayable.len()
        );
        Ok(tables)
    }

    /// `ext` is looked up exactly as given; callers fold case beforehand.
    pub fn classify(&self, ext: &str) -> Classification {
        if self.playable.contains(ext) {
            Classification::Playable
        } else if self.unplayable.contains(ext) {
            Classification::Unplayable
        } else {
            Classification::Unknown
        }
    }
}

fn read_tokens(path: &Path) -> Result<HashSet<String>> {
    let config_error = |source| SeekError::Configuration {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(config_error)?;

    let mut tokens = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(config_error)?;
        if !line.is_empty() {
            tokens.insert(line);
        }
    }
    debug!("Read {} extensions from {:?}", tokens.len(), path);
    Ok(tokens)
}
