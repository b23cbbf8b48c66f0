//! Error types for the extraction and generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JavaUmlError {
    #[error("Source folder does not exist: {0:?}")]
    SourceFolderNotFound(PathBuf),

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load the Java grammar: {0}")]
    Grammar(String),

    #[error("Invalid exclude pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl JavaUmlError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JavaUmlError>;
