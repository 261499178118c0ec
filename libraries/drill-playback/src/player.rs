//! Platform-agnostic media player capability
//!
//! The practice engine never decodes or outputs audio itself. The host
//! provides a `Player` (a browser media element, a desktop audio backend,
//! a simulator) and forwards its "finished" and "metadata ready"
//! notifications to the `PracticeSession`.

use crate::error::PlayerError;
use std::time::Duration;

/// Media playback primitive driven exclusively by `PracticeSession`
///
/// Positions and durations are in the media's native, rate-independent
/// time: a 60 second recording reports a 60 second duration at any rate.
pub trait Player {
    /// Load a recording, replacing whatever was loaded
    fn load(&mut self, audio_ref: &str);

    /// Start or resume playback
    ///
    /// # Errors
    /// Returns an error when the media cannot start (not ready, refused by the
    /// platform). The session surfaces this as a recoverable notice.
    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self);

    /// Move the playhead
    fn seek(&mut self, position: Duration);

    /// Set the speed multiplier (always > 0)
    fn set_rate(&mut self, rate: f64);

    /// Toggle the platform's native continuous looping
    ///
    /// While looping is on the player restarts the track itself and is not
    /// expected to report "finished".
    fn set_looping(&mut self, looping: bool);

    /// Current playhead position
    fn current_time(&self) -> Duration;

    /// Duration of the loaded recording, if known yet
    fn duration(&self) -> Option<Duration>;

    /// Natural duration of a recording that is not loaded
    ///
    /// Used to prefetch playlist durations. Players that can only learn
    /// durations by loading return `None` and report later through
    /// `PracticeSession::metadata_ready`.
    fn probe_duration(&mut self, audio_ref: &str) -> Option<Duration> {
        let _ = audio_ref;
        None
    }
}
