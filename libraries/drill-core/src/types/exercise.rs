use super::ExerciseId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single practice recording
///
/// Exercises are loaded once at startup and never mutated. The recording is
/// made at `original_tempo_bpm`; playback rate is always expressed relative
/// to that tempo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: ExerciseId,

    pub name: String,

    /// Category names this exercise belongs to
    #[serde(default)]
    pub categories: BTreeSet<String>,

    /// Reference handed to `Player::load`
    #[serde(default)]
    pub audio_ref: String,

    /// Reference to the notation shown alongside the recording
    #[serde(default)]
    pub score_ref: String,

    /// Tempo the recording was made at (always > 0)
    pub original_tempo_bpm: u32,
}

impl Exercise {
    /// Create an exercise with no categories and empty asset references
    pub fn new(id: impl Into<ExerciseId>, name: impl Into<String>, original_tempo_bpm: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            categories: BTreeSet::new(),
            audio_ref: String::new(),
            score_ref: String::new(),
            original_tempo_bpm,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_audio_ref(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = audio_ref.into();
        self
    }

    pub fn with_score_ref(mut self, score_ref: impl Into<String>) -> Self {
        self.score_ref = score_ref.into();
        self
    }

    /// Check category membership
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Slowest tempo the tempo control allows for this exercise
    pub fn min_tempo_bpm(&self) -> u32 {
        (self.original_tempo_bpm / 2).max(1)
    }

    /// Fastest tempo the tempo control allows for this exercise
    pub fn max_tempo_bpm(&self) -> u32 {
        self.original_tempo_bpm.saturating_mul(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_bounds_are_half_and_double() {
        let exercise = Exercise::new("a", "A", 120);
        assert_eq!(exercise.min_tempo_bpm(), 60);
        assert_eq!(exercise.max_tempo_bpm(), 240);
    }

    #[test]
    fn odd_tempo_rounds_lower_bound_down() {
        let exercise = Exercise::new("a", "A", 75);
        assert_eq!(exercise.min_tempo_bpm(), 37);
        assert_eq!(exercise.max_tempo_bpm(), 150);
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "id": "ex1",
            "name": "Paradiddles",
            "categories": ["rudiments", "warmup"],
            "audioRef": "audio/ex1.mp3",
            "scoreRef": "scores/ex1.svg",
            "originalTempoBpm": 96
        }"#;

        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.id.as_str(), "ex1");
        assert_eq!(exercise.original_tempo_bpm, 96);
        assert!(exercise.in_category("warmup"));
        assert!(!exercise.in_category("solos"));
        assert_eq!(exercise.audio_ref, "audio/ex1.mp3");
    }
}
