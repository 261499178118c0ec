//! Practice events
//!
//! The session queues events as it changes state; the UI drains them
//! (`PracticeSession::drain_events`) to stay in sync without reading
//! session internals.

use crate::guard::FinishToken;
use crate::queue::QueuePosition;
use crate::types::ModeKind;
use drill_core::ExerciseId;
use serde::{Deserialize, Serialize};

/// Events emitted by the practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PracticeEvent {
    /// Mode switched (auto toggles, playlist start/stop/completion)
    ModeChanged { mode: ModeKind },

    /// A different exercise is loaded
    ExerciseChanged { exercise_id: ExerciseId },

    /// Tempo changed; `rate` was handed to the player
    TempoChanged { bpm: u32, rate: f64 },

    /// Playlist cursor moved
    QueuePositionChanged {
        cursor: usize,
        position: QueuePosition,
    },

    /// Last queue position finished
    PlaylistCompleted { name: String },

    PlaybackStarted,

    PlaybackPaused,

    PlaybackStopped,

    /// Progress display should return to zero
    ProgressReset,

    /// A new completion cycle is open
    ///
    /// The host registers its "finished" forwarding for this token; any
    /// handler registered for an earlier token is now stale.
    FinishArmed { token: FinishToken },

    /// The player refused to start (recoverable, shown to the user)
    PlaybackFailed { message: String },

    /// Playlist position skipped because its exercise is missing
    ExerciseSkipped { exercise_id: ExerciseId, cursor: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_names() {
        let event = PracticeEvent::TempoChanged {
            bpm: 120,
            rate: 1.2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("TempoChanged"));
        assert!(json.contains("120"));

        let back: PracticeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
