//! Durable key-value storage for the queue and player settings.
//!
//! Two JSON records are kept under the [`QUEUE_KEY`] and [`SETTINGS_KEY`]
//! keys. Anything missing or malformed decodes to `None` and the engine falls
//! back to its defaults.

mod records;
mod store;

pub use records::*;
pub use store::*;
