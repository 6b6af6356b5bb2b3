use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".roster-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "roster.sqlite";

/// Ensure the database file exists, create any missing tables, and return a
/// live connection. `PRAGMA foreign_keys = ON` keeps the enrollment rows
/// referentially tied to their student and course rows even if the file is
/// edited outside this program.
pub fn ensure_schema() -> Result<Connection> {
    let db_path = db_path()?;

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(&db_path).context("failed to open SQLite database")?;
    create_tables(&conn)?;
    Ok(conn)
}

/// A throwaway schema-complete database for tests.
#[cfg(test)]
pub(crate) fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            is_male INTEGER NOT NULL,
            department INTEGER NOT NULL
        )",
        [],
    )
    .context("failed to create students table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            department INTEGER NOT NULL,
            credit INTEGER NOT NULL,
            capacity INTEGER NOT NULL,
            teacher TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create courses table")?;

    // score stays NULL until a final score is recorded
    conn.execute(
        "CREATE TABLE IF NOT EXISTS enrollments (
            student_id INTEGER NOT NULL,
            course_id TEXT NOT NULL,
            score REAL,
            PRIMARY KEY (student_id, course_id),
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(course_id) REFERENCES courses(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create enrollments table")?;

    Ok(())
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn db_path() -> Result<PathBuf> {
    let base_dirs =
        directories::BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
