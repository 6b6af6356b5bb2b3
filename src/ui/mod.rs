//! Ratatui front-end, split across logical submodules. Everything here reads
//! and mutates the roster through `Manager`'s public API and renders via
//! accessors; no invariant enforcement lives in this layer.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
