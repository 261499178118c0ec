//! Progress and time reporting
//!
//! Per-track progress comes straight from the player. Playlist progress is
//! tempo-adjusted: each play lasts `natural / (tempo / original)` seconds.
//! Natural durations are cached per exercise as they become known; plays
//! whose duration is still unknown count as zero, so totals converge while
//! metadata loads.

use crate::queue::PlaylistQueue;
use crate::tempo::compute_rate;
use drill_core::{Catalog, Exercise, ExerciseId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Natural (1×) durations keyed by exercise
#[derive(Debug, Clone, Default)]
pub struct DurationCache {
    durations: HashMap<ExerciseId, Duration>,
}

impl DurationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ExerciseId, natural: Duration) {
        self.durations.insert(id, natural);
    }

    pub fn get(&self, id: &ExerciseId) -> Option<Duration> {
        self.durations.get(id).copied()
    }

    pub fn contains(&self, id: &ExerciseId) -> bool {
        self.durations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn clear(&mut self) {
        self.durations.clear();
    }
}

/// Fraction of the track played, clamped to `[0, 1]`
pub fn track_fraction(position: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(total) if !total.is_zero() => {
            (position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

/// Wall-clock length of one play at a given tempo
pub fn play_duration(natural: Duration, tempo_bpm: u32, original_bpm: u32) -> Duration {
    let rate = compute_rate(tempo_bpm, original_bpm);
    if rate <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(natural.as_secs_f64() / rate)
}

/// Tempo a playlist position actually plays at, after slider clamping
pub fn effective_tempo(exercise: &Exercise, listed_bpm: u32) -> u32 {
    listed_bpm.clamp(exercise.min_tempo_bpm(), exercise.max_tempo_bpm())
}

/// Per-track progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackProgress {
    pub position: Duration,
    pub duration: Option<Duration>,
    pub fraction: f64,
}

/// Cumulative playlist progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistProgress {
    pub elapsed: Duration,
    pub total: Duration,
    pub cursor: usize,
    pub len: usize,
}

/// Snapshot handed to the UI on each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub track: TrackProgress,
    pub playlist: Option<PlaylistProgress>,
}

impl TrackProgress {
    pub fn new(position: Duration, duration: Option<Duration>) -> Self {
        Self {
            position,
            duration,
            fraction: track_fraction(position, duration),
        }
    }
}

/// Wall-clock length of one queue position, zero if unknown
fn position_seconds(
    queue: &PlaylistQueue,
    index: usize,
    catalog: &Catalog,
    cache: &DurationCache,
) -> Duration {
    let Some(position) = queue.positions().get(index).copied() else {
        return Duration::ZERO;
    };
    let (Some(id), Some(tempo)) = (queue.exercise_at(position), queue.tempo_at(position)) else {
        return Duration::ZERO;
    };
    let (Some(exercise), Some(natural)) = (catalog.exercise(id), cache.get(id)) else {
        return Duration::ZERO;
    };
    play_duration(
        natural,
        effective_tempo(exercise, tempo),
        exercise.original_tempo_bpm,
    )
}

/// Elapsed and total wall-clock time across a playlist
///
/// `current_elapsed` is the time already spent on the play under the cursor,
/// in wall-clock seconds.
pub fn playlist_progress(
    queue: &PlaylistQueue,
    catalog: &Catalog,
    cache: &DurationCache,
    current_elapsed: Duration,
) -> PlaylistProgress {
    let mut elapsed = Duration::ZERO;
    let mut total = Duration::ZERO;
    for index in 0..queue.len() {
        let seconds = position_seconds(queue, index, catalog, cache);
        if index < queue.cursor() {
            elapsed += seconds;
        }
        total += seconds;
    }

    PlaylistProgress {
        elapsed: elapsed + current_elapsed,
        total,
        cursor: queue.cursor(),
        len: queue.len(),
    }
}

/// Ticket for one run of the progress polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickTicket(u64);

/// Cancelable progress polling
///
/// The host calls the session on every render tick with the ticket it was
/// given when playback started. Pausing, stopping or seeking cancels the
/// run, so a tick left over from the previous run cannot report against a
/// freshly started track.
#[derive(Debug, Clone, Default)]
pub struct ProgressTicker {
    generation: u64,
    active: bool,
}

impl ProgressTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new polling run, invalidating any previous ticket
    pub fn start(&mut self) -> TickTicket {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        TickTicket(self.generation)
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn ticket(&self) -> Option<TickTicket> {
        self.active.then_some(TickTicket(self.generation))
    }

    pub fn is_live(&self, ticket: TickTicket) -> bool {
        self.active && ticket.0 == self.generation
    }
}
