//! Drill Player - Practice Playback
//!
//! Platform-agnostic practice engine for Drill Player.
//!
//! This crate provides:
//! - Tempo control relative to each recording's original tempo
//! - Randomized and stepped tempo auto-advance every N repetitions
//! - Playlist sequencing over (exercise, tempo, repetition) positions
//! - At-most-once handling of "track finished" notifications
//! - Per-track and tempo-adjusted playlist progress
//!
//! # Architecture
//!
//! `drill-playback` never touches audio. The host implements [`Player`]
//! for its platform, forwards the player's notifications to the
//! [`PracticeSession`] and drains [`PracticeEvent`]s to update its UI.
//!
//! # Example: Stepped Tempo Practice
//!
//! ```rust
//! use drill_core::{Catalog, Exercise, ExerciseId};
//! use drill_playback::{
//!     FinishOutcome, ManualClock, PlayerError, Player, PracticeConfig, PracticeSession,
//!     StepSettings,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct SilentPlayer {
//!     position: Duration,
//! }
//!
//! impl Player for SilentPlayer {
//!     fn load(&mut self, _audio_ref: &str) {}
//!     fn play(&mut self) -> Result<(), PlayerError> { Ok(()) }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, position: Duration) { self.position = position; }
//!     fn set_rate(&mut self, _rate: f64) {}
//!     fn set_looping(&mut self, _looping: bool) {}
//!     fn current_time(&self) -> Duration { self.position }
//!     fn duration(&self) -> Option<Duration> { Some(Duration::from_secs(30)) }
//! }
//!
//! let catalog = Catalog::new(vec![Exercise::new("scales", "Scales", 120)], vec![])?;
//! let clock = ManualClock::new();
//! let mut session = PracticeSession::with_clock(
//!     Arc::new(catalog),
//!     SilentPlayer::default(),
//!     PracticeConfig::default(),
//!     Box::new(clock.clone()),
//! );
//!
//! session.select_exercise(&ExerciseId::new("scales"))?;
//! session.set_step_settings(StepSettings::new(1, -10));
//! session.toggle_tempo_step_auto(true);
//! session.play()?;
//!
//! clock.advance(Duration::from_secs(30));
//! let outcome = session.track_finished(session.finish_token())?;
//! assert_eq!(outcome, FinishOutcome::Restarted { tempo_changed: true });
//! assert_eq!(session.current_bpm(), 110);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod clock;
mod error;
mod events;
mod guard;
mod player;
mod progress;
mod queue;
mod session;
mod tempo;
pub mod types;

// Public exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PlayerError, PracticeError, Result};
pub use events::PracticeEvent;
pub use guard::{CompletionGuard, FinishLease, FinishToken, Rejection};
pub use player::Player;
pub use progress::{
    effective_tempo, play_duration, playlist_progress, track_fraction, DurationCache,
    PlaylistProgress, ProgressReport, ProgressTicker, TickTicket, TrackProgress,
};
pub use queue::{build_queue, index_of, position_at, step_cursor, PlaylistQueue, QueuePosition};
pub use session::{FinishOutcome, PracticeMode, PracticeSession};
pub use tempo::{compute_rate, TempoController};
pub use types::{
    coerce_reps, parse_bound, parse_reps, ModeKind, PracticeConfig, RandomizeSettings,
    StepSettings, TransportState,
};
