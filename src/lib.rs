//! Launch records dashboard: a pure filter/aggregate engine over an
//! immutable launch dataset, plus the egui shell that drives it.
//!
//! The engine in [`data::filter`] has no UI dependency; [`state`] maps
//! control changes to engine calls and [`ui`] draws the cached results.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
