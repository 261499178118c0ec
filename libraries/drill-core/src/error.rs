//! Error types for catalog loading and validation

use crate::types::ExerciseId;
use thiserror::Error;

/// Result type alias using `CatalogError`
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog error type
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Two exercises share the same id
    #[error("Duplicate exercise id: {0}")]
    DuplicateExercise(ExerciseId),

    /// Two playlists share the same name
    #[error("Duplicate playlist name: {0}")]
    DuplicatePlaylist(String),

    /// Exercise not present in the catalog
    #[error("Exercise not found: {0}")]
    UnknownExercise(ExerciseId),

    /// A tempo value that is not a positive BPM
    #[error("Invalid tempo for {context}: {bpm} BPM")]
    InvalidTempo { context: String, bpm: u32 },

    /// A playlist item without any tempos
    #[error("Playlist '{playlist}' item {item} has no tempos")]
    EmptyTempos { playlist: String, item: usize },

    /// Catalog JSON could not be parsed
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// I/O errors while reading a catalog
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
