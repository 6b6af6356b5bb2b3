//! Core library surface for the student roster manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the in-memory roster with its integrity guarantees, transcript
//! generation on top of it, the SQLite persistence layer, and the terminal
//! front-end.
pub mod db;
pub mod models;
pub mod roster;
pub mod transcript;
pub mod ui;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to initialize the embedded SQLite store and
/// preload data.
pub use db::{ensure_schema, load_roster, save_roster};

/// The primary domain types that other layers manipulate.
pub use models::{CourseInfo, StudentInfo};
pub use roster::{Manager, RosterError};
pub use transcript::{generate_transcript, generate_transcript_filtered, Transcript};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
