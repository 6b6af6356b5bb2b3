//! Binary entry point that glues the SQLite-backed roster to the TUI.
//! The bootstrapping pipeline: bring up the database, replay the stored
//! snapshot into a fresh roster, drive the Ratatui event loop until the user
//! exits, and write the final state back.
use roster_manager::{ensure_schema, load_roster, run_app, App};

fn main() -> anyhow::Result<()> {
    let conn = ensure_schema()?;
    let roster = load_roster(&conn)?;

    let mut app = App::new(conn, roster);
    let result = run_app(&mut app);
    app.save()?;
    result
}
