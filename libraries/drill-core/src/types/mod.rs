mod category;
mod exercise;
mod ids;
mod playlist;

pub use category::CategorySelection;
pub use exercise::Exercise;
pub use ids::ExerciseId;
pub use playlist::{Playlist, PlaylistItem};
