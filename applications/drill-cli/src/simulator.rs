//! Simulated media player
//!
//! Plays nothing; advances a playhead by `tick * rate` whenever the driver
//! steps it and reports when the recording runs out.

use drill_playback::{Player, PlayerError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// What one simulated step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Not playing
    Idle,
    Playing,
    /// Reached the end and wrapped (native looping)
    Looped,
    /// Reached the end and stopped
    Ended,
}

#[derive(Debug, Default)]
struct Deck {
    loaded: Option<String>,
    playing: bool,
    looping: bool,
    rate: f64,
    position: Duration,
}

/// Player handle; clones share the same deck
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    deck: Rc<RefCell<Deck>>,
    track_lengths: Rc<HashMap<String, Duration>>,
    default_length: Duration,
}

impl SimulatedPlayer {
    pub fn new(default_length: Duration, track_lengths: HashMap<String, Duration>) -> Self {
        Self {
            deck: Rc::new(RefCell::new(Deck {
                rate: 1.0,
                ..Deck::default()
            })),
            track_lengths: Rc::new(track_lengths),
            default_length,
        }
    }

    fn length_of(&self, audio_ref: &str) -> Duration {
        self.track_lengths
            .get(audio_ref)
            .copied()
            .unwrap_or(self.default_length)
    }

    /// Longest recording this player can be asked to play
    pub fn longest_length(&self) -> Duration {
        self.track_lengths
            .values()
            .copied()
            .fold(self.default_length, Duration::max)
    }

    /// Advance the playhead by `tick` of wall-clock time
    pub fn step(&self, tick: Duration) -> Step {
        let mut deck = self.deck.borrow_mut();
        if !deck.playing {
            return Step::Idle;
        }
        let Some(length) = deck.loaded.as_deref().map(|audio| self.length_of(audio)) else {
            return Step::Idle;
        };

        let rate = deck.rate;
        deck.position += tick.mul_f64(rate);
        if deck.position < length {
            return Step::Playing;
        }

        if deck.looping {
            deck.position = deck.position.saturating_sub(length);
            Step::Looped
        } else {
            deck.position = length;
            deck.playing = false;
            Step::Ended
        }
    }
}

impl Player for SimulatedPlayer {
    fn load(&mut self, audio_ref: &str) {
        let mut deck = self.deck.borrow_mut();
        deck.loaded = Some(audio_ref.to_string());
        deck.playing = false;
        deck.position = Duration::ZERO;
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let mut deck = self.deck.borrow_mut();
        if deck.loaded.is_none() {
            return Err(PlayerError::NotReady);
        }
        deck.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.deck.borrow_mut().playing = false;
    }

    fn seek(&mut self, position: Duration) {
        self.deck.borrow_mut().position = position;
    }

    fn set_rate(&mut self, rate: f64) {
        self.deck.borrow_mut().rate = rate;
    }

    fn set_looping(&mut self, looping: bool) {
        self.deck.borrow_mut().looping = looping;
    }

    fn current_time(&self) -> Duration {
        self.deck.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        self.deck
            .borrow()
            .loaded
            .as_deref()
            .map(|audio| self.length_of(audio))
    }

    fn probe_duration(&mut self, audio_ref: &str) -> Option<Duration> {
        Some(self.length_of(audio_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> SimulatedPlayer {
        let mut lengths = HashMap::new();
        lengths.insert("short.mp3".to_string(), Duration::from_secs(2));
        SimulatedPlayer::new(Duration::from_secs(10), lengths)
    }

    #[test]
    fn test_play_requires_loaded_media() {
        let mut player = player();
        assert_eq!(player.play(), Err(PlayerError::NotReady));
        player.load("a.mp3");
        assert!(player.play().is_ok());
    }

    #[test]
    fn test_rate_scales_playhead() {
        let mut player = player();
        player.load("a.mp3");
        player.set_rate(2.0);
        player.play().unwrap();

        assert_eq!(player.step(Duration::from_secs(1)), Step::Playing);
        assert_eq!(player.current_time(), Duration::from_secs(2));
    }

    #[test]
    fn test_end_without_looping_stops() {
        let mut player = player();
        player.load("short.mp3");
        player.play().unwrap();

        assert_eq!(player.step(Duration::from_secs(1)), Step::Playing);
        assert_eq!(player.step(Duration::from_secs(1)), Step::Ended);
        assert_eq!(player.step(Duration::from_secs(1)), Step::Idle);
    }

    #[test]
    fn test_end_with_looping_wraps() {
        let mut player = player();
        player.load("short.mp3");
        player.set_looping(true);
        player.play().unwrap();

        assert_eq!(player.step(Duration::from_millis(2500)), Step::Looped);
        assert_eq!(player.current_time(), Duration::from_millis(500));
    }

    #[test]
    fn test_longest_length_covers_configured_tracks() {
        assert_eq!(player().longest_length(), Duration::from_secs(10));

        let mut lengths = HashMap::new();
        lengths.insert("long.mp3".to_string(), Duration::from_secs(45));
        lengths.insert("short.mp3".to_string(), Duration::from_secs(2));
        let player = SimulatedPlayer::new(Duration::from_secs(10), lengths);
        assert_eq!(player.longest_length(), Duration::from_secs(45));
    }

    #[test]
    fn test_lengths_fall_back_to_default() {
        let mut player = player();
        assert_eq!(player.probe_duration("short.mp3"), Some(Duration::from_secs(2)));
        assert_eq!(player.probe_duration("other.mp3"), Some(Duration::from_secs(10)));
    }
}
