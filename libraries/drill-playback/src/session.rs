//! Practice session - the playback state machine
//!
//! Owns every piece of mutable practice state (mode, selected exercise,
//! tempo, playlist cursor, repetition counter) and is the only thing that
//! drives the `Player`. The UI issues commands; the host forwards the
//! player's "finished" and "metadata ready" notifications; the session
//! decides what happens next.

use crate::{
    clock::{Clock, SystemClock},
    error::{PracticeError, Result},
    events::PracticeEvent,
    guard::{CompletionGuard, FinishToken, Rejection},
    player::Player,
    progress::{
        playlist_progress, DurationCache, ProgressReport, ProgressTicker, TickTicket,
        TrackProgress,
    },
    queue::{PlaylistQueue, QueuePosition},
    tempo::TempoController,
    types::{ModeKind, PracticeConfig, RandomizeSettings, StepSettings, TransportState},
};
use drill_core::{Catalog, CategorySelection, Exercise, ExerciseId, FilterCriteria, Playlist};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What happens when a track finishes
///
/// Exactly one behavior is active at a time. A running playlist carries its
/// queue, so queue and cursor exist only while sequencing.
#[derive(Debug, Clone, Default)]
pub enum PracticeMode {
    /// Single exercise; loops natively when looping is enabled
    #[default]
    Idle,

    /// Randomize the tempo every N repetitions
    RandomizeAuto,

    /// Step the tempo every N repetitions
    TempoStepAuto,

    /// Play through a playlist
    PlaylistSequencing(PlaylistQueue),
}

impl PracticeMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            PracticeMode::Idle => ModeKind::Idle,
            PracticeMode::RandomizeAuto => ModeKind::RandomizeAuto,
            PracticeMode::TempoStepAuto => ModeKind::TempoStepAuto,
            PracticeMode::PlaylistSequencing(_) => ModeKind::PlaylistSequencing,
        }
    }
}

/// What a "finished" notification led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishOutcome {
    /// Dropped by the completion guard
    Ignored(Rejection),

    /// The player loops natively; nothing to do
    Looped,

    /// Auto mode restarted the track from zero
    Restarted { tempo_changed: bool },

    /// Playlist moved to the next position
    Advanced { cursor: usize },

    /// Playlist ran out of positions; session is idle and stopped
    PlaylistCompleted,

    /// Single exercise ended without looping
    Stopped,
}

/// The practice playback engine
pub struct PracticeSession<P: Player> {
    catalog: Arc<Catalog>,
    player: P,
    clock: Box<dyn Clock>,
    config: PracticeConfig,

    // State
    mode: PracticeMode,
    selected: Option<Exercise>,
    category: CategorySelection,
    transport: TransportState,
    rep_counter: u32,

    // Tempo
    tempo: TempoController,
    randomize: RandomizeSettings,
    step: StepSettings,
    dragging: bool,
    loop_enabled: bool,

    // Completion and progress
    guard: CompletionGuard,
    ticker: ProgressTicker,
    durations: DurationCache,

    // Event queue for UI synchronization
    pending_events: Vec<PracticeEvent>,
}

impl<P: Player> PracticeSession<P> {
    /// Create a session on the system clock
    pub fn new(catalog: Arc<Catalog>, player: P, config: PracticeConfig) -> Self {
        Self::with_clock(catalog, player, config, Box::new(SystemClock))
    }

    /// Create a session on a caller-supplied clock
    pub fn with_clock(
        catalog: Arc<Catalog>,
        player: P,
        config: PracticeConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        let loop_enabled = config.loop_single;
        Self {
            catalog,
            player,
            clock,
            mode: PracticeMode::Idle,
            selected: None,
            category: CategorySelection::All,
            transport: TransportState::Stopped,
            rep_counter: 0,
            tempo: TempoController::new(&config),
            randomize: RandomizeSettings::default(),
            step: StepSettings::default(),
            dragging: false,
            loop_enabled,
            guard: CompletionGuard::new(config.finish_guard()),
            ticker: ProgressTicker::new(),
            durations: DurationCache::new(),
            pending_events: Vec::new(),
            config,
        }
    }

    /// Use a deterministic tempo randomizer
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.tempo = TempoController::with_rng(&self.config, StdRng::seed_from_u64(seed));
        if let Some(exercise) = &self.selected {
            self.tempo.set_exercise(exercise);
        }
        self
    }

    // ===== Exercise & Category Selection =====

    /// Select an exercise
    ///
    /// Outside a playlist this stops playback, loads the exercise at its
    /// original tempo and resets progress. During a playlist it jumps the
    /// cursor to the exercise's first play and resumes the playlist there.
    pub fn select_exercise(&mut self, id: &ExerciseId) -> Result<()> {
        let exercise = self.catalog.require_exercise(id)?.clone();

        if let PracticeMode::PlaylistSequencing(queue) = &self.mode {
            let index = queue
                .first_index_of(id)
                .ok_or_else(|| PracticeError::ExerciseNotInPlaylist(id.clone()))?;
            return self.play_queue_index(index);
        }

        self.halt_playback();
        self.load_exercise(exercise);
        self.apply_rate();
        self.rep_counter = 0;
        self.reset_progress();
        self.sync_looping();
        Ok(())
    }

    /// Store the picker's category
    pub fn select_category(&mut self, selection: CategorySelection) {
        self.category = selection;
    }

    pub fn category(&self) -> &CategorySelection {
        &self.category
    }

    /// Exercises the picker should offer in the current mode
    pub fn visible_exercises(&self) -> Vec<&Exercise> {
        match &self.mode {
            PracticeMode::PlaylistSequencing(queue) => self
                .catalog
                .filter_exercises(&FilterCriteria::Playlist(queue.playlist())),
            _ => self
                .catalog
                .filter_exercises(&FilterCriteria::Category(&self.category)),
        }
    }

    // ===== Playlist =====

    /// Start a playlist from its first position
    ///
    /// Auto modes are forced off and their settings cleared.
    pub fn start_playlist(&mut self, playlist: &Playlist) -> Result<()> {
        // Items without tempos expand to nothing
        let queue = PlaylistQueue::new(playlist.clone());
        if queue.is_empty() {
            return Err(PracticeError::EmptyPlaylist(playlist.name.clone()));
        }

        self.halt_playback();
        self.randomize = RandomizeSettings::default();
        self.step = StepSettings::default();
        self.rep_counter = 0;

        info!(
            "Starting playlist '{}' ({} plays)",
            playlist.name,
            queue.len()
        );
        self.set_mode(PracticeMode::PlaylistSequencing(queue));
        self.prefetch_durations(playlist);

        self.play_queue_index(0)
    }

    /// Start a catalog playlist by name
    pub fn start_playlist_by_name(&mut self, name: &str) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let playlist = catalog
            .playlist(name)
            .ok_or_else(|| PracticeError::UnknownPlaylist(name.to_string()))?;
        self.start_playlist(playlist)
    }

    /// Leave playlist mode
    ///
    /// Pauses, returns to `Idle` and re-selects the first exercise under the
    /// "all categories" filter. No-op outside a playlist.
    pub fn stop_playlist(&mut self) {
        if !matches!(self.mode, PracticeMode::PlaylistSequencing(_)) {
            debug!("stop_playlist outside a playlist ignored");
            return;
        }

        self.halt_playback();
        self.set_mode(PracticeMode::Idle);
        self.category = CategorySelection::All;

        match self.catalog.first_exercise().cloned() {
            Some(exercise) => {
                self.load_exercise(exercise);
                self.apply_rate();
                self.reset_progress();
            }
            None => {
                self.selected = None;
                self.tempo.clear();
            }
        }
        self.sync_looping();
    }

    /// Move the playlist cursor by `delta` and play from there
    ///
    /// Moving past either end of the queue is a no-op.
    pub fn navigate_queue(&mut self, delta: isize) -> Result<()> {
        let PracticeMode::PlaylistSequencing(queue) = &self.mode else {
            return Err(PracticeError::NotInPlaylist);
        };
        let target = queue.stepped_index(delta);
        if target == queue.cursor() {
            return Ok(());
        }
        self.play_queue_index(target)
    }

    // ===== Auto Modes =====

    /// Turn randomized auto-advance on or off (disables stepped mode)
    pub fn toggle_randomize_auto(&mut self, on: bool) {
        self.toggle_auto(ModeKind::RandomizeAuto, on);
    }

    /// Turn stepped-tempo auto-advance on or off (disables randomized mode)
    pub fn toggle_tempo_step_auto(&mut self, on: bool) {
        self.toggle_auto(ModeKind::TempoStepAuto, on);
    }

    fn toggle_auto(&mut self, target: ModeKind, on: bool) {
        let current = self.mode.kind();
        if current == ModeKind::PlaylistSequencing {
            debug!(?target, "Auto mode toggle ignored during playlist");
            return;
        }
        if on == (current == target) {
            return;
        }

        let mode = match (target, on) {
            (ModeKind::RandomizeAuto, true) => PracticeMode::RandomizeAuto,
            (ModeKind::TempoStepAuto, true) => PracticeMode::TempoStepAuto,
            _ => PracticeMode::Idle,
        };

        self.rep_counter = 0;
        // Any handler tied to the old mode is dropped
        self.start_cycle();
        self.set_mode(mode);
    }

    pub fn set_randomize_settings(&mut self, settings: RandomizeSettings) {
        self.randomize = RandomizeSettings {
            reps_before_change: settings.reps_before_change.max(1),
            ..settings
        };
    }

    pub fn randomize_settings(&self) -> RandomizeSettings {
        self.randomize
    }

    pub fn set_step_settings(&mut self, settings: StepSettings) {
        self.step = StepSettings {
            reps_per_step: settings.reps_per_step.max(1),
            ..settings
        };
    }

    pub fn step_settings(&self) -> StepSettings {
        self.step
    }

    /// Enable or disable native single-exercise looping
    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
        self.sync_looping();
    }

    /// True exactly when no mode is active and looping is enabled
    pub fn native_looping(&self) -> bool {
        self.loop_enabled && matches!(self.mode, PracticeMode::Idle)
    }

    // ===== Tempo =====

    /// Set the tempo explicitly; clamped, never throttled
    pub fn set_tempo(&mut self, bpm: u32) -> Result<u32> {
        self.require_loaded()?;
        let bpm = self.tempo.set_explicit(bpm);
        self.apply_rate();
        Ok(bpm)
    }

    /// User started dragging the tempo control
    pub fn begin_tempo_drag(&mut self) {
        self.dragging = true;
    }

    /// Tempo value while dragging
    pub fn drag_tempo(&mut self, bpm: u32) -> Result<u32> {
        self.dragging = true;
        self.set_tempo(bpm)
    }

    pub fn end_tempo_drag(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Programmatic tempo change subject to the cooldown
    ///
    /// Returns `false` when throttled or while the user is dragging; the
    /// state is then untouched.
    pub fn set_tempo_throttled(&mut self, bpm: u32) -> Result<bool> {
        self.require_loaded()?;
        if self.dragging {
            return Ok(false);
        }
        let now = self.clock.now();
        if self.tempo.set_throttled(bpm, now).is_none() {
            return Ok(false);
        }
        self.apply_rate();
        Ok(true)
    }

    /// Randomize the tempo now with the configured bounds
    pub fn randomize_tempo_now(&mut self) -> Result<Option<u32>> {
        self.require_loaded()?;
        let now = self.clock.now();
        let picked = self
            .tempo
            .randomize(self.randomize.min_bpm, self.randomize.max_bpm, true, now);
        if picked.is_some() {
            self.apply_rate();
        }
        Ok(picked)
    }

    /// Back to the selected exercise's original tempo
    pub fn reset_tempo(&mut self) -> Result<u32> {
        self.require_loaded()?;
        let original = self.tempo.original_bpm();
        self.set_tempo(original)
    }

    pub fn current_bpm(&self) -> u32 {
        self.tempo.current_bpm()
    }

    pub fn rate(&self) -> f64 {
        self.tempo.rate()
    }

    pub fn tempo(&self) -> &TempoController {
        &self.tempo
    }

    // ===== Transport =====

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        if let PracticeMode::PlaylistSequencing(queue) = &self.mode {
            if let Some(index) = queue.pending() {
                return self.play_queue_index(index);
            }
        } else {
            self.require_loaded()?;
        }

        match self.transport {
            TransportState::Playing => Ok(()),
            TransportState::Paused => self.start_player(),
            TransportState::Stopped => {
                self.start_cycle();
                self.start_player()
            }
        }
    }

    pub fn pause(&mut self) {
        if self.transport == TransportState::Playing {
            self.player.pause();
            self.ticker.cancel();
            self.transport = TransportState::Paused;
            self.emit(PracticeEvent::PlaybackPaused);
        }
    }

    /// Stop and rewind; the mode is kept
    pub fn stop(&mut self) {
        self.halt_playback();
        self.reset_progress();
    }

    /// Move the playhead; cancels any in-flight progress tick
    pub fn seek(&mut self, position: Duration) {
        self.player.seek(position);
        self.ticker.cancel();
        if self.transport == TransportState::Playing {
            self.ticker.start();
        }
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport == TransportState::Playing
    }

    // ===== Player Notifications =====

    /// Token the host should attach to the next "finished" notification
    pub fn finish_token(&self) -> FinishToken {
        self.guard.token()
    }

    /// Handle the player's "track finished" notification
    ///
    /// Each logical completion is processed at most once: stale tokens,
    /// notifications arriving mid-transition and (outside playlists) trailing
    /// duplicates inside the guard window are dropped.
    pub fn track_finished(&mut self, token: FinishToken) -> Result<FinishOutcome> {
        let now = self.clock.now();
        let in_playlist = matches!(self.mode, PracticeMode::PlaylistSequencing(_));

        let lease = match self.guard.admit(token, now, !in_playlist) {
            Ok(lease) => lease,
            Err(rejection) => {
                debug!(?rejection, "Finish notification dropped");
                return Ok(FinishOutcome::Ignored(rejection));
            }
        };

        let outcome = self.handle_finished(now);
        let released_at = self.clock.now();
        self.guard.release(lease, released_at, !in_playlist);
        outcome
    }

    /// Record a natural duration reported by the player
    pub fn metadata_ready(&mut self, exercise_id: ExerciseId, natural: Duration) {
        self.durations.insert(exercise_id, natural);
    }

    fn handle_finished(&mut self, now: Instant) -> Result<FinishOutcome> {
        match self.mode.kind() {
            ModeKind::PlaylistSequencing => self.advance_playlist(),
            ModeKind::RandomizeAuto => {
                let mut tempo_changed = false;
                if self.count_repetition(self.randomize.reps_before_change) {
                    if self.dragging {
                        debug!("Randomize skipped while tempo is being dragged");
                    } else if let Some(bpm) = self.tempo.randomize(
                        self.randomize.min_bpm,
                        self.randomize.max_bpm,
                        false,
                        now,
                    ) {
                        info!(bpm, "Randomized tempo");
                        self.apply_rate();
                        tempo_changed = true;
                    }
                }
                self.restart_track()?;
                Ok(FinishOutcome::Restarted { tempo_changed })
            }
            ModeKind::TempoStepAuto => {
                let mut tempo_changed = false;
                if self.count_repetition(self.step.reps_per_step) {
                    if self.dragging {
                        debug!("Tempo step skipped while tempo is being dragged");
                    } else {
                        let before = self.tempo.current_bpm();
                        let bpm = self.tempo.bump_by(self.step.step_bpm, now);
                        if bpm != before {
                            info!(bpm, "Stepped tempo");
                            self.apply_rate();
                            tempo_changed = true;
                        }
                    }
                }
                self.restart_track()?;
                Ok(FinishOutcome::Restarted { tempo_changed })
            }
            ModeKind::Idle => {
                if self.native_looping() {
                    return Ok(FinishOutcome::Looped);
                }
                self.ticker.cancel();
                self.reset_progress();
                self.transport = TransportState::Stopped;
                self.emit(PracticeEvent::PlaybackStopped);
                Ok(FinishOutcome::Stopped)
            }
        }
    }

    /// Count one repetition; true when the threshold was reached
    fn count_repetition(&mut self, threshold: u32) -> bool {
        self.rep_counter += 1;
        if self.rep_counter >= threshold.max(1) {
            self.rep_counter = 0;
            true
        } else {
            false
        }
    }

    fn advance_playlist(&mut self) -> Result<FinishOutcome> {
        let next = match &self.mode {
            PracticeMode::PlaylistSequencing(queue) => queue.next_index(),
            _ => None,
        };

        let Some(index) = next else {
            self.complete_playlist();
            return Ok(FinishOutcome::PlaylistCompleted);
        };

        self.play_queue_index(index)?;
        Ok(match &self.mode {
            PracticeMode::PlaylistSequencing(queue) => FinishOutcome::Advanced {
                cursor: queue.cursor(),
            },
            _ => FinishOutcome::PlaylistCompleted,
        })
    }

    // ===== Progress =====

    /// Ticket of the running progress loop, if playback is active
    pub fn tick_ticket(&self) -> Option<TickTicket> {
        self.ticker.ticket()
    }

    /// Progress for one render tick; `None` once the loop was canceled
    pub fn progress_tick(&mut self, ticket: TickTicket) -> Option<ProgressReport> {
        if !self.ticker.is_live(ticket) {
            return None;
        }
        Some(self.progress())
    }

    /// Current per-track and playlist progress
    pub fn progress(&mut self) -> ProgressReport {
        let position = self.player.current_time();
        let duration = self.player.duration();

        if let (Some(exercise), Some(natural)) = (&self.selected, duration) {
            if !self.durations.contains(&exercise.id) {
                self.durations.insert(exercise.id.clone(), natural);
            }
        }

        let playlist = match &self.mode {
            PracticeMode::PlaylistSequencing(queue) => {
                let rate = self.tempo.rate();
                let current = if rate > 0.0 {
                    Duration::from_secs_f64(position.as_secs_f64() / rate)
                } else {
                    Duration::ZERO
                };
                Some(playlist_progress(
                    queue,
                    &self.catalog,
                    &self.durations,
                    current,
                ))
            }
            _ => None,
        };

        ProgressReport {
            track: TrackProgress::new(position, duration),
            playlist,
        }
    }

    pub fn durations(&self) -> &DurationCache {
        &self.durations
    }

    // ===== Session State =====

    pub fn mode(&self) -> &PracticeMode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn playlist_queue(&self) -> Option<&PlaylistQueue> {
        match &self.mode {
            PracticeMode::PlaylistSequencing(queue) => Some(queue),
            _ => None,
        }
    }

    pub fn selected_exercise(&self) -> Option<&Exercise> {
        self.selected.as_ref()
    }

    pub fn rep_counter(&self) -> u32 {
        self.rep_counter
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    /// Read-only access to the player; only the session drives it
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Tear the session down to its startup state
    pub fn reset(&mut self) {
        self.player.pause();
        self.player.seek(Duration::ZERO);
        self.ticker.cancel();
        self.guard.reset();

        self.mode = PracticeMode::Idle;
        self.selected = None;
        self.category = CategorySelection::All;
        self.transport = TransportState::Stopped;
        self.rep_counter = 0;
        self.tempo.clear();
        self.randomize = RandomizeSettings::default();
        self.step = StepSettings::default();
        self.dragging = false;
        self.loop_enabled = self.config.loop_single;
        self.durations.clear();
        self.pending_events.clear();
        self.sync_looping();
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PracticeEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit(&mut self, event: PracticeEvent) {
        self.pending_events.push(event);
    }

    // ===== Internals =====

    fn require_loaded(&self) -> Result<()> {
        if self.selected.is_some() && self.tempo.is_loaded() {
            Ok(())
        } else {
            Err(PracticeError::NoExerciseSelected)
        }
    }

    fn set_mode(&mut self, mode: PracticeMode) {
        self.mode = mode;
        self.emit(PracticeEvent::ModeChanged {
            mode: self.mode.kind(),
        });
        self.sync_looping();
    }

    fn sync_looping(&mut self) {
        let looping = self.native_looping();
        self.player.set_looping(looping);
    }

    /// Open a new completion cycle, abandoning handlers of the old one
    fn start_cycle(&mut self) {
        let token = self.guard.next_cycle();
        self.emit(PracticeEvent::FinishArmed { token });
    }

    /// Pause, cancel progress and pending completions
    fn halt_playback(&mut self) {
        self.player.pause();
        self.ticker.cancel();
        self.guard.next_cycle();
        if self.transport != TransportState::Stopped {
            self.transport = TransportState::Stopped;
            self.emit(PracticeEvent::PlaybackStopped);
        }
    }

    fn reset_progress(&mut self) {
        self.player.seek(Duration::ZERO);
        self.ticker.cancel();
        self.emit(PracticeEvent::ProgressReset);
    }

    fn load_exercise(&mut self, exercise: Exercise) {
        debug!(exercise = %exercise.id, "Loading exercise");
        self.player.load(&exercise.audio_ref);
        self.tempo.set_exercise(&exercise);
        self.emit(PracticeEvent::ExerciseChanged {
            exercise_id: exercise.id.clone(),
        });
        self.selected = Some(exercise);
    }

    fn apply_rate(&mut self) {
        let rate = self.tempo.rate();
        self.player.set_rate(rate);
        self.emit(PracticeEvent::TempoChanged {
            bpm: self.tempo.current_bpm(),
            rate,
        });
    }

    fn start_player(&mut self) -> Result<()> {
        match self.player.play() {
            Ok(()) => {
                self.transport = TransportState::Playing;
                self.ticker.start();
                self.emit(PracticeEvent::PlaybackStarted);
                Ok(())
            }
            Err(err) => {
                warn!("Playback failed: {}", err);
                self.transport = TransportState::Stopped;
                self.ticker.cancel();
                self.emit(PracticeEvent::PlaybackFailed {
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    fn restart_track(&mut self) -> Result<()> {
        self.reset_progress();
        self.start_cycle();
        self.start_player()
    }

    fn prefetch_durations(&mut self, playlist: &Playlist) {
        let catalog = Arc::clone(&self.catalog);
        for id in playlist.exercise_ids() {
            if self.durations.contains(id) {
                continue;
            }
            let Some(exercise) = catalog.exercise(id) else {
                continue;
            };
            if let Some(natural) = self.player.probe_duration(&exercise.audio_ref) {
                self.durations.insert(id.clone(), natural);
            }
        }
    }

    fn playlist_queue_mut(&mut self) -> Option<&mut PlaylistQueue> {
        match &mut self.mode {
            PracticeMode::PlaylistSequencing(queue) => Some(queue),
            _ => None,
        }
    }

    /// Play the first playable queue position at or after `target`
    ///
    /// Positions whose exercise is missing from the catalog are skipped. The
    /// cursor only moves once the player has actually started.
    fn play_queue_index(&mut self, target: usize) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let Some(queue) = self.playlist_queue() else {
            return Err(PracticeError::NotInPlaylist);
        };
        debug_assert!(target < queue.len(), "queue index {} out of range", target);

        let mut skipped: Vec<(ExerciseId, usize)> = Vec::new();
        let mut found: Option<(usize, QueuePosition, Exercise, u32)> = None;
        for index in target..queue.len() {
            let Some(position) = queue.positions().get(index).copied() else {
                break;
            };
            let (Some(id), Some(listed)) = (queue.exercise_at(position), queue.tempo_at(position))
            else {
                continue;
            };
            match catalog.exercise(id) {
                Some(exercise) => {
                    found = Some((index, position, exercise.clone(), listed));
                    break;
                }
                None => {
                    if skipped.last().map(|(last, _)| last) != Some(id) {
                        skipped.push((id.clone(), index));
                    }
                }
            }
        }

        for (exercise_id, cursor) in skipped {
            warn!(exercise = %exercise_id, cursor, "Playlist references a missing exercise, skipping");
            self.emit(PracticeEvent::ExerciseSkipped {
                exercise_id,
                cursor,
            });
        }

        let Some((index, position, exercise, listed)) = found else {
            self.complete_playlist();
            return Ok(());
        };

        self.player.pause();
        self.ticker.cancel();
        if self.selected.as_ref().map(|e| &e.id) != Some(&exercise.id) {
            self.load_exercise(exercise);
        }
        self.tempo.set_explicit(listed);
        self.apply_rate();
        self.reset_progress();
        self.start_cycle();

        // The target's exercise and tempo stay applied, but the cursor keeps
        // pointing at the last position that actually played until a retry
        // succeeds. Progress reports that cursor in the meantime.
        if let Err(err) = self.start_player() {
            if let Some(queue) = self.playlist_queue_mut() {
                queue.set_pending(index);
            }
            return Err(err);
        }

        if let Some(queue) = self.playlist_queue_mut() {
            queue.set_cursor(index);
        }
        self.emit(PracticeEvent::QueuePositionChanged {
            cursor: index,
            position,
        });
        Ok(())
    }

    fn complete_playlist(&mut self) {
        let name = self
            .playlist_queue()
            .map(|queue| queue.playlist().name.clone())
            .unwrap_or_default();
        info!("Playlist '{}' completed", name);

        self.player.pause();
        self.ticker.cancel();
        self.guard.next_cycle();
        self.transport = TransportState::Stopped;
        self.emit(PracticeEvent::PlaylistCompleted { name });
        self.set_mode(PracticeMode::Idle);
        self.emit(PracticeEvent::PlaybackStopped);
    }
}
