//! Drives a practice session against the simulated player
//!
//! Each step advances the manual clock and the simulated playhead by one
//! tick, polls progress through the session's ticket and forwards "finished"
//! notifications with the current finish token.

use crate::simulator::{SimulatedPlayer, Step};
use drill_playback::{
    FinishOutcome, ManualClock, ModeKind, PracticeEvent, PracticeSession, ProgressReport,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a run did
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub plays: u32,
    /// Progress tickets dropped because playback restarted or stopped
    pub expired_tickets: u32,
    pub final_bpm: u32,
    pub final_mode: ModeKind,
    pub last_progress: Option<ProgressReport>,
}

pub struct Runner {
    session: PracticeSession<SimulatedPlayer>,
    player: SimulatedPlayer,
    clock: ManualClock,
    tick: Duration,
    json_events: bool,
}

impl Runner {
    pub fn new(
        session: PracticeSession<SimulatedPlayer>,
        player: SimulatedPlayer,
        clock: ManualClock,
        tick: Duration,
    ) -> Self {
        Self {
            session,
            player,
            clock,
            tick,
            json_events: false,
        }
    }

    /// Print every event as a JSON line on stdout
    pub fn with_json_events(mut self, enabled: bool) -> Self {
        self.json_events = enabled;
        self
    }

    pub fn session_mut(&mut self) -> &mut PracticeSession<SimulatedPlayer> {
        &mut self.session
    }

    /// Step until `max_plays` tracks have ended or playback stops
    pub fn run(&mut self, max_plays: u32) -> anyhow::Result<RunSummary> {
        self.flush_events()?;

        let track_ticks =
            self.player.longest_length().as_millis() / self.tick.as_millis().max(1) + 1;
        // Slowest rate is 0.5, so a play never takes more than twice its length
        let max_ticks = track_ticks * 2 * (u128::from(max_plays) + 1);

        let mut plays = 0;
        let mut expired_tickets = 0;
        let mut last_progress = None;
        let mut ticket = None;
        let mut ticks: u128 = 0;

        while plays < max_plays && self.session.is_playing() {
            ticks += 1;
            if ticks > max_ticks {
                warn!("Simulation did not finish within {} ticks", max_ticks);
                break;
            }

            self.clock.advance(self.tick);
            let step = self.player.step(self.tick);

            // A ticket stays in use until the session stops honoring it
            if ticket.is_none() {
                ticket = self.session.tick_ticket();
            }
            if let Some(current) = ticket {
                if let Some(report) = self.session.progress_tick(current) {
                    debug!(
                        position = ?report.track.position,
                        fraction = report.track.fraction,
                        "Progress"
                    );
                    last_progress = Some(report);
                } else {
                    debug!("Progress ticket expired");
                    expired_tickets += 1;
                    ticket = None;
                }
            }

            match step {
                Step::Idle | Step::Playing => {}
                Step::Looped => {
                    plays += 1;
                    info!(plays, bpm = self.session.current_bpm(), "Looped");
                }
                Step::Ended => {
                    plays += 1;
                    let token = self.session.finish_token();
                    match self.session.track_finished(token) {
                        Ok(outcome) => self.log_outcome(plays, outcome),
                        Err(err) => {
                            warn!("Stopping run: {}", err);
                            self.flush_events()?;
                            break;
                        }
                    }
                }
            }

            self.flush_events()?;
        }

        Ok(RunSummary {
            plays,
            expired_tickets,
            final_bpm: self.session.current_bpm(),
            final_mode: self.session.mode_kind(),
            last_progress,
        })
    }

    fn log_outcome(&self, plays: u32, outcome: FinishOutcome) {
        let bpm = self.session.current_bpm();
        match outcome {
            FinishOutcome::Advanced { cursor } => {
                info!(plays, cursor, bpm, "Advanced playlist");
            }
            FinishOutcome::Restarted { tempo_changed } => {
                info!(plays, bpm, tempo_changed, "Restarted");
            }
            other => info!(plays, bpm, outcome = ?other, "Track finished"),
        }
    }

    fn flush_events(&mut self) -> anyhow::Result<()> {
        for event in self.session.drain_events() {
            if self.json_events {
                println!("{}", serde_json::to_string(&event)?);
            }
            match &event {
                PracticeEvent::PlaybackFailed { message } => warn!("Playback failed: {}", message),
                PracticeEvent::ExerciseSkipped { exercise_id, cursor } => {
                    warn!(cursor, "Skipped missing exercise {}", exercise_id);
                }
                PracticeEvent::PlaylistCompleted { name } => info!("Playlist '{}' done", name),
                other => debug!(event = ?other, "Event"),
            }
        }
        Ok(())
    }
}
