pub mod migrations;
pub mod repository;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use migrations::run_migrations;

/// Open (or create) the journal database and bring the schema up to date.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Opening database at {:?}", path))?;

    // WAL so the dashboard and one-shot commands can overlap
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    prepare(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> Result<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    run_migrations(&conn)?;
    Ok(conn)
}
