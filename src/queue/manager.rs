use rand::Rng;
use tracing::debug;

use crate::track::Track;

use super::shuffle::{position_of, shuffle_keeping_cursor};
use super::types::{Advance, Direction, Jump, Removal, RepeatMode};

/// Ordered play sequence plus the cursor over it.
///
/// Invariant: `cursor` is `None` iff `items` is empty, otherwise it is a
/// valid index. While shuffle is on, `saved_order` holds the pre-shuffle
/// order with the same membership as `items`.
#[derive(Debug, Clone, Default)]
pub struct QueueManager {
    items: Vec<Track>,
    cursor: Option<usize>,
    saved_order: Option<Vec<Track>>,
    shuffle: bool,
    repeat: RepeatMode,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from persisted parts.
    ///
    /// Duplicate ids are dropped. A saved order is only trusted when shuffle is
    /// on and it holds exactly the same tracks as `items`; otherwise the
    /// current order becomes the order to restore to.
    pub fn restore(
        items: Vec<Track>,
        saved_order: Option<Vec<Track>>,
        shuffle: bool,
        repeat: RepeatMode,
    ) -> Self {
        let mut queue = Self {
            repeat,
            ..Self::default()
        };
        queue.enqueue(items);

        if shuffle {
            let saved = saved_order
                .map(dedup_by_id)
                .filter(|saved| same_members(saved, &queue.items))
                .unwrap_or_else(|| queue.items.clone());
            queue.saved_order = Some(saved);
            queue.shuffle = true;
        }
        queue
    }

    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The track under the cursor.
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|c| self.items.get(c))
    }

    pub fn saved_order(&self) -> Option<&[Track]> {
        self.saved_order.as_deref()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn contains(&self, id: &str) -> bool {
        position_of(&self.items, id).is_some()
    }

    /// Append every track whose id is not queued yet. Returns how many were added.
    ///
    /// The cursor is left alone, except that a previously empty queue gets its
    /// cursor on the first entry.
    pub fn enqueue(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let mut added = 0;
        for track in tracks {
            if self.contains(&track.id) {
                continue;
            }
            if let Some(saved) = self.saved_order.as_mut() {
                saved.push(track.clone());
            }
            self.items.push(track);
            added += 1;
        }

        if added > 0 && self.cursor.is_none() {
            self.cursor = Some(0);
        }
        if added > 0 {
            debug!(added, len = self.items.len(), "enqueued tracks");
        }
        added
    }

    /// Remove the entry at `index`. Out-of-range indices are ignored.
    ///
    /// Removing an entry before the cursor shifts the cursor down so it keeps
    /// pointing at the same track. Removing the current entry leaves the cursor
    /// on whatever slid into its slot (clamped to the new last index).
    pub fn remove_at(&mut self, index: usize) -> Option<Removal> {
        if index >= self.items.len() {
            return None;
        }

        let track = self.items.remove(index);
        if let Some(saved) = self.saved_order.as_mut() {
            if let Some(pos) = position_of(saved, &track.id) {
                saved.remove(pos);
            }
        }

        let was_current = self.cursor == Some(index);
        self.cursor = match self.cursor {
            _ if self.items.is_empty() => None,
            Some(c) if index < c => Some(c - 1),
            Some(c) => Some(c.min(self.items.len() - 1)),
            None => Some(0),
        };

        debug!(index, id = %track.id, was_current, cursor = ?self.cursor, "removed queue entry");
        Some(Removal { track, was_current })
    }

    /// Empty the queue. Shuffle stays on if it was on, with an empty saved order.
    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.saved_order = if self.shuffle { Some(Vec::new()) } else { None };
    }

    /// Put the cursor on `track`, appending it first when it is not queued.
    pub fn jump_to(&mut self, track: &Track) -> Jump {
        if let Some(i) = position_of(&self.items, &track.id) {
            self.cursor = Some(i);
            return Jump::Found(i);
        }

        self.enqueue([track.clone()]);
        let last = self.items.len() - 1;
        self.cursor = Some(last);
        Jump::Appended(last)
    }

    /// Put the cursor on `index` if it is in range.
    pub fn jump_to_index(&mut self, index: usize) -> Option<usize> {
        if index < self.items.len() {
            self.cursor = Some(index);
            Some(index)
        } else {
            None
        }
    }

    /// Move the cursor one step in `direction` under `repeat`.
    ///
    /// | direction | none          | all            | one                   |
    /// |-----------|---------------|----------------|-----------------------|
    /// | next      | exhausted at end | wrap to 0   | restart current track |
    /// | previous  | stay at 0     | wrap to last   | same as `all`         |
    pub fn advance(&mut self, direction: Direction, repeat: RepeatMode) -> Advance {
        let Some(cursor) = self.cursor else {
            return Advance::Exhausted;
        };
        let last = self.items.len() - 1;

        let next = match (direction, repeat) {
            (Direction::Next, RepeatMode::One) => return Advance::Restart(cursor),
            (Direction::Next, RepeatMode::None) if cursor == last => return Advance::Exhausted,
            (Direction::Next, RepeatMode::All) if cursor == last => 0,
            (Direction::Next, _) => cursor + 1,
            (Direction::Previous, RepeatMode::None) if cursor == 0 => 0,
            (Direction::Previous, _) if cursor == 0 => last,
            (Direction::Previous, _) => cursor - 1,
        };

        self.cursor = Some(next);
        Advance::Moved(next)
    }

    /// Turn shuffle on or off. Returns whether anything changed.
    ///
    /// Enabling snapshots the current order and shuffles around the cursor so
    /// the playing entry keeps its index. Disabling restores the snapshot and
    /// re-finds the current track by id.
    pub fn set_shuffle<R: Rng + ?Sized>(&mut self, enabled: bool, rng: &mut R) -> bool {
        if enabled == self.shuffle {
            return false;
        }
        self.shuffle = enabled;

        if enabled {
            self.saved_order = Some(self.items.clone());
            shuffle_keeping_cursor(&mut self.items, self.cursor, rng);
            debug!(len = self.items.len(), cursor = ?self.cursor, "shuffle enabled");
            return true;
        }

        if let Some(saved) = self.saved_order.take() {
            let current_id = self.current().map(|t| t.id.clone());
            self.items = saved;
            self.cursor = match current_id {
                Some(id) => position_of(&self.items, &id)
                    .or_else(|| self.cursor.map(|c| c.min(self.items.len().saturating_sub(1)))),
                None => None,
            };
            if self.items.is_empty() {
                self.cursor = None;
            }
        }
        debug!(len = self.items.len(), cursor = ?self.cursor, "shuffle disabled");
        true
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }
}

fn dedup_by_id(tracks: Vec<Track>) -> Vec<Track> {
    let mut out: Vec<Track> = Vec::with_capacity(tracks.len());
    for t in tracks {
        if position_of(&out, &t.id).is_none() {
            out.push(t);
        }
    }
    out
}

fn same_members(a: &[Track], b: &[Track]) -> bool {
    a.len() == b.len() && a.iter().all(|t| position_of(b, &t.id).is_some())
}
