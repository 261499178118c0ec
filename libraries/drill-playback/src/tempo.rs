//! Tempo control
//!
//! Converts BPM to playback rate and applies explicit, throttled, stepped and
//! randomized tempo changes within the selected exercise's slider range
//! (half to double its original tempo).

use crate::types::PracticeConfig;
use drill_core::Exercise;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use tracing::debug;

/// Playback rate for a tempo: `bpm / original`
pub fn compute_rate(bpm: u32, original_bpm: u32) -> f64 {
    if original_bpm == 0 {
        return 1.0;
    }
    f64::from(bpm) / f64::from(original_bpm)
}

/// Constraints for randomized tempo picks
#[derive(Debug, Clone, Copy)]
struct RandomizerLimits {
    attempts: u32,
    min_distance: u32,
    max_distance: u32,
}

/// Tempo state for the selected exercise
///
/// Holds the current BPM, the slider bounds and the bookkeeping needed for
/// throttling (time of the last programmatic change) and for keeping random
/// picks away from the previous random pick.
#[derive(Debug, Clone)]
pub struct TempoController {
    current_bpm: u32,
    original_bpm: u32,
    min_bpm: u32,
    max_bpm: u32,
    last_change_at: Option<Instant>,
    previous_random_bpm: Option<u32>,
    cooldown: Duration,
    limits: RandomizerLimits,
    rng: StdRng,
}

impl TempoController {
    /// Create a controller with an entropy-seeded generator
    pub fn new(config: &PracticeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a controller with a caller-supplied generator
    pub fn with_rng(config: &PracticeConfig, rng: StdRng) -> Self {
        Self {
            current_bpm: 0,
            original_bpm: 0,
            min_bpm: 0,
            max_bpm: 0,
            last_change_at: None,
            previous_random_bpm: None,
            cooldown: config.tempo_cooldown(),
            limits: RandomizerLimits {
                attempts: config.randomize_attempts.max(1),
                min_distance: config.min_random_distance,
                max_distance: config.max_random_distance.max(config.min_random_distance),
            },
            rng,
        }
    }

    /// Switch to an exercise, starting at its original tempo
    pub fn set_exercise(&mut self, exercise: &Exercise) {
        self.original_bpm = exercise.original_tempo_bpm;
        self.min_bpm = exercise.min_tempo_bpm();
        self.max_bpm = exercise.max_tempo_bpm();
        self.current_bpm = exercise.original_tempo_bpm;
        self.previous_random_bpm = None;
    }

    /// Forget the exercise and all history
    pub fn clear(&mut self) {
        self.current_bpm = 0;
        self.original_bpm = 0;
        self.min_bpm = 0;
        self.max_bpm = 0;
        self.last_change_at = None;
        self.previous_random_bpm = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.original_bpm > 0
    }

    pub fn current_bpm(&self) -> u32 {
        self.current_bpm
    }

    pub fn original_bpm(&self) -> u32 {
        self.original_bpm
    }

    /// Slider range for the selected exercise
    pub fn bounds(&self) -> RangeInclusive<u32> {
        self.min_bpm..=self.max_bpm
    }

    pub fn previous_random_bpm(&self) -> Option<u32> {
        self.previous_random_bpm
    }

    /// Playback rate for the current tempo
    pub fn rate(&self) -> f64 {
        compute_rate(self.current_bpm, self.original_bpm)
    }

    /// Clamp a tempo into the slider range
    pub fn clamp(&self, bpm: u32) -> u32 {
        bpm.clamp(self.min_bpm, self.max_bpm)
    }

    /// Check whether a programmatic change would be rejected right now
    pub fn is_throttled(&self, now: Instant) -> bool {
        self.last_change_at
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
    }

    /// Set the tempo directly (user drag or typed value)
    ///
    /// Out-of-range values are clamped, never rejected. Bypasses throttling.
    pub fn set_explicit(&mut self, bpm: u32) -> u32 {
        if !self.is_loaded() {
            return self.current_bpm;
        }
        self.current_bpm = self.clamp(bpm);
        self.current_bpm
    }

    /// Set the tempo programmatically, subject to the cooldown
    ///
    /// Returns `None` (with the state untouched) when throttled.
    pub fn set_throttled(&mut self, bpm: u32, now: Instant) -> Option<u32> {
        if !self.is_loaded() {
            return None;
        }
        if self.is_throttled(now) {
            debug!(bpm, "Tempo change throttled");
            return None;
        }
        self.current_bpm = self.clamp(bpm);
        self.last_change_at = Some(now);
        Some(self.current_bpm)
    }

    /// Add a signed step to the tempo, clamped to the slider range
    pub fn bump_by(&mut self, delta_bpm: i32, now: Instant) -> u32 {
        if !self.is_loaded() {
            return self.current_bpm;
        }
        let target = i64::from(self.current_bpm) + i64::from(delta_bpm);
        let target = target.clamp(i64::from(self.min_bpm), i64::from(self.max_bpm));
        self.current_bpm = u32::try_from(target).unwrap_or(self.min_bpm);
        self.last_change_at = Some(now);
        self.current_bpm
    }

    /// Pick a new random tempo
    ///
    /// Bounds default to half/double the original tempo and are clamped to the
    /// slider range. Explicitly inverted bounds (`min > max`) leave the tempo
    /// unchanged. Non-immediate calls are throttled. Returns the new tempo, or
    /// `None` when nothing changed.
    pub fn randomize(
        &mut self,
        min_bound: Option<u32>,
        max_bound: Option<u32>,
        immediate: bool,
        now: Instant,
    ) -> Option<u32> {
        if !self.is_loaded() {
            return None;
        }
        if let (Some(min), Some(max)) = (min_bound, max_bound) {
            if min > max {
                debug!(min, max, "Inverted randomize bounds, tempo unchanged");
                return None;
            }
        }
        if !immediate && self.is_throttled(now) {
            debug!("Randomize throttled");
            return None;
        }

        let low = self.clamp(min_bound.unwrap_or(self.min_bpm));
        let high = self.clamp(max_bound.unwrap_or(self.max_bpm));
        debug_assert!(low <= high, "clamped bounds out of order");
        let (low, high) = if low <= high { (low, high) } else { (high, low) };

        let pick = if low == high {
            low
        } else {
            self.pick_with_distance(low, high)
        };

        self.current_bpm = pick;
        self.previous_random_bpm = Some(pick);
        if !immediate {
            self.last_change_at = Some(now);
        }
        Some(pick)
    }

    /// Uniform draw in `[low, high]` that tries to land between the minimum and
    /// maximum distance from the previous random pick
    fn pick_with_distance(&mut self, low: u32, high: u32) -> u32 {
        let Some(previous) = self.previous_random_bpm else {
            return self.rng.gen_range(low..=high);
        };

        // Span too narrow to honor the minimum distance
        if high - low < self.limits.min_distance {
            return self.rng.gen_range(low..=high);
        }

        let accepted = self.limits.min_distance..=self.limits.max_distance;
        for _ in 0..self.limits.attempts {
            let candidate = self.rng.gen_range(low..=high);
            if accepted.contains(&candidate.abs_diff(previous)) {
                return candidate;
            }
        }

        debug!(previous, low, high, "No candidate met the distance rule, using unconstrained draw");
        self.rng.gen_range(low..=high)
    }
}
