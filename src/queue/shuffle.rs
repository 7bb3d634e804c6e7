//! Helpers to shuffle the queue without moving the current track.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::track::Track;

/// Shuffle `items` in place (Fisher-Yates via `SliceRandom::shuffle`) and then
/// swap the track that was at `cursor` back into slot `cursor`.
///
/// The playing entry keeps its index, so the cursor stays valid.
pub(super) fn shuffle_keeping_cursor<R: Rng + ?Sized>(
    items: &mut [Track],
    cursor: Option<usize>,
    rng: &mut R,
) {
    let current_id = cursor.and_then(|c| items.get(c)).map(|t| t.id.clone());
    items.shuffle(rng);

    if let (Some(c), Some(id)) = (cursor, current_id) {
        if let Some(landed) = items.iter().position(|t| t.id == id) {
            items.swap(landed, c);
        }
    }
}

/// Index of the track with `id` inside `items`.
pub(super) fn position_of(items: &[Track], id: &str) -> Option<usize> {
    items.iter().position(|t| t.id == id)
}
