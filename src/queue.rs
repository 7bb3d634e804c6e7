//! The play queue.
//!
//! `QueueManager` owns the ordered track list, the cursor marking the active
//! entry, and the shuffle and repeat policies that decide what plays next.
//! It never talks to the media resource; the engine does that.

mod manager;
mod shuffle;
mod types;

pub use manager::*;
pub use types::*;
