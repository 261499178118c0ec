use super::ExerciseId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// A curated sequence of exercises
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,

    pub items: Vec<PlaylistItem>,
}

/// One exercise in a playlist, played at each tempo in order
///
/// `tempos` keeps playback order, not sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub exercise_id: ExerciseId,

    pub tempos: Vec<u32>,

    /// Plays per tempo, never less than 1
    #[serde(default = "default_repetitions", deserialize_with = "at_least_one")]
    pub repetitions_per_tempo: u32,
}

fn default_repetitions() -> u32 {
    1
}

fn at_least_one<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(u32::try_from(value.max(1)).unwrap_or(u32::MAX))
}

impl Playlist {
    pub fn new(name: impl Into<String>, items: Vec<PlaylistItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Ids of every exercise this playlist references
    pub fn exercise_ids(&self) -> BTreeSet<&ExerciseId> {
        self.items.iter().map(|item| &item.exercise_id).collect()
    }

    /// Check whether any item references the exercise
    pub fn references(&self, id: &ExerciseId) -> bool {
        self.items.iter().any(|item| &item.exercise_id == id)
    }

    /// Total number of plays the playlist expands to
    pub fn total_plays(&self) -> usize {
        self.items.iter().map(PlaylistItem::plays).sum()
    }
}

impl PlaylistItem {
    /// Create an item; a repetition count of 0 is raised to 1
    pub fn new(exercise_id: impl Into<ExerciseId>, tempos: Vec<u32>, repetitions_per_tempo: u32) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            tempos,
            repetitions_per_tempo: repetitions_per_tempo.max(1),
        }
    }

    /// Number of queue positions this item expands to
    pub fn plays(&self) -> usize {
        self.tempos.len() * self.repetitions_per_tempo.max(1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_plays_multiplies_tempos_by_reps() {
        let playlist = Playlist::new(
            "Daily",
            vec![
                PlaylistItem::new("a", vec![80, 100], 2),
                PlaylistItem::new("b", vec![60, 70, 80], 1),
            ],
        );
        assert_eq!(playlist.total_plays(), 7);
    }

    #[test]
    fn zero_repetitions_become_one() {
        let item = PlaylistItem::new("a", vec![90], 0);
        assert_eq!(item.repetitions_per_tempo, 1);

        let json = r#"{"exerciseId": "a", "tempos": [90], "repetitionsPerTempo": -3}"#;
        let item: PlaylistItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.repetitions_per_tempo, 1);
    }

    #[test]
    fn missing_repetitions_default_to_one() {
        let json = r#"{"exerciseId": "a", "tempos": [90, 100]}"#;
        let item: PlaylistItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.repetitions_per_tempo, 1);
        assert_eq!(item.plays(), 2);
    }

    #[test]
    fn exercise_ids_are_deduplicated() {
        let playlist = Playlist::new(
            "Mixed",
            vec![
                PlaylistItem::new("a", vec![80], 1),
                PlaylistItem::new("b", vec![80], 1),
                PlaylistItem::new("a", vec![100], 1),
            ],
        );
        assert_eq!(playlist.exercise_ids().len(), 2);
        assert!(playlist.references(&ExerciseId::new("b")));
        assert!(!playlist.references(&ExerciseId::new("c")));
    }
}
