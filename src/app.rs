//! Application module: the UI-side model fed by engine events.
//!
//! `App` never mutates player state. It keeps the latest snapshot it was sent,
//! the list selection and the last notice to show.

mod model;

pub use model::*;
