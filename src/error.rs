use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeekError {
    #[error("Configuration error: cannot read {path}: {source}")]
    Configuration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigFormat(String),

    #[error("Cannot list directory {path}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk lost track of {path}: {reason}")]
    Integrity { path: PathBuf, reason: String },

    #[error("Cannot create output {path}: {source}")]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to close output {path}: {source}")]
    OutputClose {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Cannot install interrupt handler: {0}")]
    InterruptHandler(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SeekError {
    /// Recoverable kinds are logged where they happen and never abort a run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SeekError::Enumeration { .. } | SeekError::OutputClose { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SeekError>;
