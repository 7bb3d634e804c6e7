//! cadenza: a terminal music player built around a single-owner playback engine.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod media;
pub mod persistence;
pub mod queue;
pub mod runtime;
pub mod track;
pub mod ui;
