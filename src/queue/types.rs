//! Small enums used by the queue and the engine.

use serde::{Deserialize, Serialize};

/// Policy for end-of-track and end-of-queue behavior.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last track of the queue.
    #[default]
    None,
    /// Repeat the current track when it ends.
    One,
    /// Wrap around to the start of the queue.
    All,
}

impl RepeatMode {
    /// Cycle `None -> All -> One -> None`.
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::One => "one",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Result of moving the cursor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The cursor now points at this index; load and play it.
    Moved(usize),
    /// Repeat-one: the cursor did not move, restart the track at this index from 0.
    Restart(usize),
    /// Nothing left to play in this direction.
    Exhausted,
}

/// Where `jump_to` put the cursor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Jump {
    /// The track was already queued at this index.
    Found(usize),
    /// The track was appended at this index.
    Appended(usize),
}

/// What `remove_at` took out of the queue.
#[derive(Debug, Clone)]
pub struct Removal {
    pub track: crate::track::Track,
    /// The removed entry was the one under the cursor.
    pub was_current: bool,
}
