//! At-most-once handling of "track finished" notifications
//!
//! Every time the session starts a new play run (load, restart, repetition)
//! or abandons the current one (exercise switch, playlist stop, auto mode
//! off) it opens a new cycle. Notifications carry the token of the cycle
//! they were registered for; tokens from older cycles are stale and dropped.
//!
//! Outside playlists a handled notification also keeps the guard closed for
//! a short hold window, absorbing a trailing duplicate that some platforms
//! fire right after the restart.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;

/// Identifies the play cycle a completion handler belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinishToken(u64);

impl FinishToken {
    pub fn cycle(self) -> u64 {
        self.0
    }
}

/// Proof that a notification was admitted; must be handed back on release
#[derive(Debug)]
#[must_use = "a lease must be released to reopen the guard"]
pub struct FinishLease {
    cycle: u64,
}

/// Why a notification was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Token from an abandoned cycle
    Stale,
    /// Another notification is being handled
    InProgress,
    /// Arrived inside the hold window after the previous one
    Cooldown,
}

#[derive(Debug, Clone)]
pub struct CompletionGuard {
    cycle: u64,
    in_progress: bool,
    held_until: Option<Instant>,
    hold: Duration,
}

impl CompletionGuard {
    pub fn new(hold: Duration) -> Self {
        Self {
            cycle: 0,
            in_progress: false,
            held_until: None,
            hold,
        }
    }

    /// Token for the current cycle
    pub fn token(&self) -> FinishToken {
        FinishToken(self.cycle)
    }

    /// Abandon the current cycle and open a new one
    pub fn next_cycle(&mut self) -> FinishToken {
        self.cycle = self.cycle.wrapping_add(1);
        self.token()
    }

    /// Admit a notification
    ///
    /// `respect_hold` is false in playlist mode, where each repetition has its
    /// own cycle and the hold window would swallow real completions of very
    /// short tracks.
    pub fn admit(
        &mut self,
        token: FinishToken,
        now: Instant,
        respect_hold: bool,
    ) -> Result<FinishLease, Rejection> {
        if token.0 != self.cycle {
            return Err(Rejection::Stale);
        }
        if self.in_progress {
            return Err(Rejection::InProgress);
        }
        if respect_hold && self.held_until.is_some_and(|until| now < until) {
            return Err(Rejection::Cooldown);
        }
        self.in_progress = true;
        Ok(FinishLease { cycle: self.cycle })
    }

    /// Reopen the guard after the transition's side effects were issued
    pub fn release(&mut self, lease: FinishLease, now: Instant, hold: bool) {
        trace!(cycle = lease.cycle, "Completion guard released");
        self.in_progress = false;
        self.held_until = hold.then(|| now + self.hold);
    }

    /// Drop any hold window and in-progress mark
    pub fn reset(&mut self) {
        self.in_progress = false;
        self.held_until = None;
        self.next_cycle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: Duration = Duration::from_millis(250);

    #[test]
    fn stale_tokens_are_rejected() {
        let mut guard = CompletionGuard::new(HOLD);
        let old = guard.token();
        guard.next_cycle();

        assert_eq!(
            guard.admit(old, Instant::now(), true).unwrap_err(),
            Rejection::Stale
        );
    }

    #[test]
    fn second_admit_before_release_is_rejected() {
        let mut guard = CompletionGuard::new(HOLD);
        let token = guard.token();
        let now = Instant::now();

        let lease = guard.admit(token, now, true).unwrap();
        assert_eq!(guard.admit(token, now, true).unwrap_err(), Rejection::InProgress);
        guard.release(lease, now, true);
    }

    #[test]
    fn hold_window_absorbs_trailing_duplicate() {
        let mut guard = CompletionGuard::new(HOLD);
        let now = Instant::now();

        let lease = guard.admit(guard.token(), now, true).unwrap();
        let token = guard.next_cycle();
        guard.release(lease, now, true);

        let soon = now + Duration::from_millis(50);
        assert_eq!(guard.admit(token, soon, true).unwrap_err(), Rejection::Cooldown);

        let later = now + Duration::from_millis(300);
        assert!(guard.admit(token, later, true).is_ok());
    }

    #[test]
    fn hold_is_ignored_when_not_respected() {
        let mut guard = CompletionGuard::new(HOLD);
        let now = Instant::now();

        let lease = guard.admit(guard.token(), now, true).unwrap();
        let token = guard.next_cycle();
        guard.release(lease, now, true);

        assert!(guard.admit(token, now, false).is_ok());
    }
}
