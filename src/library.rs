//! Local catalog: scan a directory tree into playable [`Track`]s.
//!
//! [`Track`]: crate::track::Track

mod scan;

pub use scan::{file_url_for, scan};
