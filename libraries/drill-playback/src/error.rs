//! Error types for practice playback

use drill_core::{CatalogError, ExerciseId};
use thiserror::Error;

/// Errors reported by a `Player` implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// Media is not loaded or not ready to start
    #[error("Media not ready")]
    NotReady,

    /// The platform refused to start playback
    #[error("Playback rejected: {0}")]
    Rejected(String),
}

/// Practice session errors
#[derive(Debug, Error)]
pub enum PracticeError {
    /// The player could not start; the session stays in its current mode
    #[error("Playback failed: {0}")]
    PlaybackFailed(#[from] PlayerError),

    /// Command only valid while a playlist is running
    #[error("No playlist is active")]
    NotInPlaylist,

    /// Exercise selected during a playlist that the playlist never plays
    #[error("Exercise {0} is not part of the active playlist")]
    ExerciseNotInPlaylist(ExerciseId),

    /// Playlist name not in the catalog
    #[error("Playlist not found: {0}")]
    UnknownPlaylist(String),

    /// Playlist without any items
    #[error("Playlist '{0}' has no items")]
    EmptyPlaylist(String),

    /// Command needs a selected exercise
    #[error("No exercise selected")]
    NoExerciseSelected,

    /// Catalog lookup failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result type for practice operations
pub type Result<T> = std::result::Result<T, PracticeError>;
