//! Core types for practice playback

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which behavior runs when a track finishes
///
/// Mirrors the variants of the session's mode without the playlist payload,
/// for display and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    /// Single exercise, looping natively (or stopping) at the end
    Idle,

    /// Randomize the tempo every N repetitions
    RandomizeAuto,

    /// Step the tempo by a fixed amount every N repetitions
    TempoStepAuto,

    /// Play through a playlist queue
    PlaylistSequencing,
}

/// Transport state as the session last commanded it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

/// Coerce a repetition count to at least 1
///
/// Zero and negative counts behave exactly like 1.
pub fn coerce_reps(value: i64) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}

/// Parse a repetition count typed by the user
///
/// Anything that is not an integer counts as 1.
pub fn parse_reps(input: &str) -> u32 {
    input.trim().parse::<i64>().map(coerce_reps).unwrap_or(1)
}

/// Parse an optional BPM bound; blank or invalid input means "no bound"
pub fn parse_bound(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|&bpm| bpm > 0)
}

/// Settings for randomized auto-advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizeSettings {
    /// Repetitions played before the tempo changes (>= 1)
    pub reps_before_change: u32,

    /// Lower tempo bound (default: half the original tempo)
    pub min_bpm: Option<u32>,

    /// Upper tempo bound (default: double the original tempo)
    pub max_bpm: Option<u32>,
}

impl RandomizeSettings {
    pub fn new(reps_before_change: i64, min_bpm: Option<u32>, max_bpm: Option<u32>) -> Self {
        Self {
            reps_before_change: coerce_reps(reps_before_change),
            min_bpm,
            max_bpm,
        }
    }

    /// Build from raw text inputs
    pub fn from_inputs(reps: &str, min_bpm: &str, max_bpm: &str) -> Self {
        Self {
            reps_before_change: parse_reps(reps),
            min_bpm: parse_bound(min_bpm),
            max_bpm: parse_bound(max_bpm),
        }
    }
}

impl Default for RandomizeSettings {
    fn default() -> Self {
        Self {
            reps_before_change: 1,
            min_bpm: None,
            max_bpm: None,
        }
    }
}

/// Settings for stepped-tempo auto-advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSettings {
    /// Repetitions played before each step (>= 1)
    pub reps_per_step: u32,

    /// Signed BPM change per step; negative slows down, zero only restarts
    pub step_bpm: i32,
}

impl StepSettings {
    pub fn new(reps_per_step: i64, step_bpm: i32) -> Self {
        Self {
            reps_per_step: coerce_reps(reps_per_step),
            step_bpm,
        }
    }

    /// Build from raw text inputs; an unparseable step is 0
    pub fn from_inputs(reps: &str, step_bpm: &str) -> Self {
        Self {
            reps_per_step: parse_reps(reps),
            step_bpm: step_bpm.trim().parse().unwrap_or(0),
        }
    }
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            reps_per_step: 1,
            step_bpm: 0,
        }
    }
}

/// Configuration for a practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// Minimum time between programmatic tempo changes (default: 300ms)
    pub tempo_cooldown_ms: u64,

    /// How long a handled "finished" keeps absorbing duplicates (default: 250ms)
    pub finish_guard_ms: u64,

    /// Draws tried before the randomizer gives up on the distance rule (default: 25)
    pub randomize_attempts: u32,

    /// Smallest accepted jump from the previous random tempo (default: 8 BPM)
    pub min_random_distance: u32,

    /// Largest accepted jump from the previous random tempo (default: 90 BPM)
    pub max_random_distance: u32,

    /// Loop a single exercise natively when no mode is active (default: true)
    pub loop_single: bool,
}

impl PracticeConfig {
    pub fn tempo_cooldown(&self) -> Duration {
        Duration::from_millis(self.tempo_cooldown_ms)
    }

    pub fn finish_guard(&self) -> Duration {
        Duration::from_millis(self.finish_guard_ms)
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            tempo_cooldown_ms: 300,
            finish_guard_ms: 250,
            randomize_attempts: 25,
            min_random_distance: 8,
            max_random_distance: 90,
            loop_single: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PracticeConfig::default();
        assert_eq!(config.tempo_cooldown(), Duration::from_millis(300));
        assert_eq!(config.finish_guard(), Duration::from_millis(250));
        assert_eq!(config.randomize_attempts, 25);
        assert_eq!(config.min_random_distance, 8);
        assert_eq!(config.max_random_distance, 90);
        assert!(config.loop_single);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PracticeConfig =
            serde_json::from_str(r#"{"tempo_cooldown_ms": 400}"#).unwrap();
        assert_eq!(config.tempo_cooldown_ms, 400);
        assert_eq!(config.randomize_attempts, 25);
    }

    #[test]
    fn reps_below_one_become_one() {
        assert_eq!(coerce_reps(0), 1);
        assert_eq!(coerce_reps(-5), 1);
        assert_eq!(coerce_reps(4), 4);
        assert_eq!(parse_reps("abc"), 1);
        assert_eq!(parse_reps(""), 1);
        assert_eq!(parse_reps(" 3 "), 3);
        assert_eq!(parse_reps("-2"), 1);
        assert_eq!(parse_reps("2.5"), 1);
    }

    #[test]
    fn bounds_parse_to_none_when_blank() {
        assert_eq!(parse_bound(""), None);
        assert_eq!(parse_bound("fast"), None);
        assert_eq!(parse_bound("0"), None);
        assert_eq!(parse_bound("120"), Some(120));
    }

    #[test]
    fn settings_from_inputs() {
        let randomize = RandomizeSettings::from_inputs("0", "80", "");
        assert_eq!(randomize.reps_before_change, 1);
        assert_eq!(randomize.min_bpm, Some(80));
        assert_eq!(randomize.max_bpm, None);

        let step = StepSettings::from_inputs("x", "-5");
        assert_eq!(step.reps_per_step, 1);
        assert_eq!(step.step_bpm, -5);

        let step = StepSettings::from_inputs("2", "fast");
        assert_eq!(step.step_bpm, 0);
    }
}
