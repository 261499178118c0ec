//! Playlist queue
//!
//! Flattens a playlist into an ordered list of plays:
//!
//! ```text
//! for each item (in order)
//!   for each tempo of the item (in order)
//!     repeat `repetitions_per_tempo` times
//! ```
//!
//! Every queue index maps to exactly one `(item, tempo, repetition)` triple
//! and back. Navigation is index-based and non-destructive.

use drill_core::{ExerciseId, Playlist, PlaylistItem};
use serde::{Deserialize, Serialize};

/// One flattened play: item × tempo × repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueuePosition {
    pub item_index: usize,
    pub tempo_index: usize,
    /// In `[0, repetitions_per_tempo)`
    pub repetition: u32,
}

impl QueuePosition {
    pub fn new(item_index: usize, tempo_index: usize, repetition: u32) -> Self {
        Self {
            item_index,
            tempo_index,
            repetition,
        }
    }
}

/// Expand a playlist into its queue
pub fn build_queue(playlist: &Playlist) -> Vec<QueuePosition> {
    let mut queue = Vec::with_capacity(playlist.total_plays());
    for (item_index, item) in playlist.items.iter().enumerate() {
        for tempo_index in 0..item.tempos.len() {
            for repetition in 0..item.repetitions_per_tempo.max(1) {
                queue.push(QueuePosition::new(item_index, tempo_index, repetition));
            }
        }
    }
    queue
}

/// Index of a position in the queue, `None` when absent
pub fn index_of(queue: &[QueuePosition], position: QueuePosition) -> Option<usize> {
    queue.iter().position(|&p| p == position)
}

/// Position at an index; total for `index < queue.len()`
pub fn position_at(queue: &[QueuePosition], index: usize) -> Option<QueuePosition> {
    queue.get(index).copied()
}

/// Move a cursor by `delta`, clamped to `[0, len - 1]`
///
/// Moving past either end stays at the end.
pub fn step_cursor(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}

/// A playlist being played, with its queue and cursor
#[derive(Debug, Clone)]
pub struct PlaylistQueue {
    playlist: Playlist,
    positions: Vec<QueuePosition>,
    cursor: usize,
    /// Index that failed to start and should be retried on the next play
    pending: Option<usize>,
}

impl PlaylistQueue {
    pub fn new(playlist: Playlist) -> Self {
        let positions = build_queue(&playlist);
        Self {
            playlist,
            positions,
            cursor: 0,
            pending: None,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn positions(&self) -> &[QueuePosition] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Position under the cursor
    pub fn current(&self) -> Option<QueuePosition> {
        position_at(&self.positions, self.cursor)
    }

    pub(crate) fn set_cursor(&mut self, index: usize) {
        debug_assert!(index < self.len(), "cursor {} out of range", index);
        if index < self.len() {
            self.cursor = index;
            self.pending = None;
        }
    }

    pub(crate) fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub(crate) fn set_pending(&mut self, index: usize) {
        self.pending = Some(index);
    }

    /// Index after the cursor, `None` at the end of the playlist
    pub fn next_index(&self) -> Option<usize> {
        let next = self.cursor + 1;
        (next < self.len()).then_some(next)
    }

    /// Cursor after a clamped `delta` move
    pub fn stepped_index(&self, delta: isize) -> usize {
        step_cursor(self.cursor, delta, self.len())
    }

    pub fn item(&self, position: QueuePosition) -> Option<&PlaylistItem> {
        self.playlist.items.get(position.item_index)
    }

    /// Listed tempo for a position
    pub fn tempo_at(&self, position: QueuePosition) -> Option<u32> {
        self.item(position)
            .and_then(|item| item.tempos.get(position.tempo_index).copied())
    }

    pub fn exercise_at(&self, position: QueuePosition) -> Option<&ExerciseId> {
        self.item(position).map(|item| &item.exercise_id)
    }

    /// Index of the first play of an exercise (first tempo, first repetition)
    pub fn first_index_of(&self, exercise_id: &ExerciseId) -> Option<usize> {
        let item_index = self
            .playlist
            .items
            .iter()
            .position(|item| &item.exercise_id == exercise_id)?;
        index_of(&self.positions, QueuePosition::new(item_index, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist() -> Playlist {
        Playlist::new(
            "Test",
            vec![
                PlaylistItem::new("a", vec![80, 100], 2),
                PlaylistItem::new("b", vec![60], 3),
            ],
        )
    }

    #[test]
    fn single_item_expands_tempo_major() {
        let playlist = Playlist::new("One", vec![PlaylistItem::new("a", vec![80, 100], 2)]);
        let queue = build_queue(&playlist);
        assert_eq!(
            queue,
            vec![
                QueuePosition::new(0, 0, 0),
                QueuePosition::new(0, 0, 1),
                QueuePosition::new(0, 1, 0),
                QueuePosition::new(0, 1, 1),
            ]
        );
    }

    #[test]
    fn queue_length_matches_playlist() {
        let playlist = playlist();
        assert_eq!(build_queue(&playlist).len(), 7);
        assert_eq!(playlist.total_plays(), 7);
    }

    #[test]
    fn tempos_keep_listed_order() {
        let playlist = Playlist::new("Down", vec![PlaylistItem::new("a", vec![120, 90, 100], 1)]);
        let queue = PlaylistQueue::new(playlist);
        let tempos: Vec<u32> = queue
            .positions()
            .iter()
            .map(|&p| queue.tempo_at(p).unwrap())
            .collect();
        assert_eq!(tempos, vec![120, 90, 100]);
    }

    #[test]
    fn index_of_missing_position_is_none() {
        let queue = build_queue(&playlist());
        assert_eq!(index_of(&queue, QueuePosition::new(5, 0, 0)), None);
        assert_eq!(index_of(&queue, QueuePosition::new(1, 0, 2)), Some(6));
        assert_eq!(position_at(&queue, 7), None);
    }

    #[test]
    fn step_cursor_clamps_at_ends() {
        assert_eq!(step_cursor(0, -1, 4), 0);
        assert_eq!(step_cursor(3, 1, 4), 3);
        assert_eq!(step_cursor(1, 1, 4), 2);
        assert_eq!(step_cursor(2, -1, 4), 1);
        assert_eq!(step_cursor(0, 1, 0), 0);
    }

    #[test]
    fn next_index_stops_at_end() {
        let mut queue = PlaylistQueue::new(playlist());
        assert_eq!(queue.next_index(), Some(1));
        queue.set_cursor(6);
        assert_eq!(queue.next_index(), None);
    }

    #[test]
    fn first_index_of_exercise() {
        let queue = PlaylistQueue::new(playlist());
        assert_eq!(queue.first_index_of(&ExerciseId::new("a")), Some(0));
        assert_eq!(queue.first_index_of(&ExerciseId::new("b")), Some(4));
        assert_eq!(queue.first_index_of(&ExerciseId::new("z")), None);
    }

    #[test]
    fn setting_cursor_clears_pending_retry() {
        let mut queue = PlaylistQueue::new(playlist());
        queue.set_pending(3);
        assert_eq!(queue.pending(), Some(3));
        queue.set_cursor(3);
        assert_eq!(queue.pending(), None);
        assert_eq!(queue.current(), Some(QueuePosition::new(0, 1, 1)));
    }
}
