//! runlens library: event model, renderers, sources and the viewer.
//!
//! The binary in `main.rs` only wires these together; integration tests in
//! `tests/` drive the controller through the same public API.

pub mod cli;
pub mod config;
pub mod event;
pub mod interrupt;
pub mod output;
pub mod render;
pub mod source;
pub mod ui;
