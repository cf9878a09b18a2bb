use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Game not found: {0}")]
    TitleNotFound(String),

    #[error("\"{query}\" is ambiguous, it matches: {}", candidates.join(", "))]
    AmbiguousTitle {
        query: String,
        candidates: Vec<String>,
    },

    #[error("Library not found: {0}")]
    UnknownVolume(String),

    #[error("Cannot move {title}: {} already exists", path.display())]
    DestinationOccupied { title: String, path: PathBuf },

    #[error("Manifest {manifest} has no \"{key}\" field")]
    MissingField { manifest: String, key: String },

    #[error("Manifest {manifest} has a non-numeric \"{key}\" field: \"{value}\"")]
    InvalidField {
        manifest: String,
        key: String,
        value: String,
    },

    #[error("Library {volume} could not be read: {source}")]
    VolumeUnreadable {
        volume: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {title}, nothing was changed: {source}")]
    Relocation {
        title: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Partial relocation of {title}: manifest is on {manifest_on} but the game files are \
         still on {install_dir_on} ({source}). Run the same move again to finish it."
    )]
    PartialRelocation {
        title: String,
        manifest_on: String,
        install_dir_on: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {title}, nothing was changed: {source}")]
    Deletion {
        title: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Partial deletion of {title}: manifest removed but {} could not be deleted ({source})",
        path.display()
    )]
    PartialDeletion {
        title: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stopped early: {0}")]
    Interrupted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Input error: {0}")]
    Prompt(String),
}

impl StorageError {
    /// True when a title was left with its manifest and files on different libraries.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            StorageError::PartialRelocation { .. } | StorageError::PartialDeletion { .. }
        )
    }

    /// Unwraps the I/O cause, or wraps any other error as one.
    pub fn into_io(self) -> std::io::Error {
        match self {
            StorageError::Io(e) => e,
            other => std::io::Error::other(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
