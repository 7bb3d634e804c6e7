//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive runtime
//! behavior and helpers to load configuration from disk.

mod load;
mod schema;

pub(crate) use load::xdg_app_dir;
pub use load::{CONFIG_PATH_VAR, config_path};
pub use schema::*;
