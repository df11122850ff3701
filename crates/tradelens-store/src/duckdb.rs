//! `DuckDB` connection setup.

use std::path::Path;

use ::duckdb::Connection;

/// Open a database file and apply session settings.
///
/// # Errors
/// Returns an error if the database file cannot be opened or configured.
pub fn open_connection(path: &Path) -> Result<Connection, ::duckdb::Error> {
    let connection = Connection::open(path)?;
    configure_connection(&connection)?;
    Ok(connection)
}

/// Open a throwaway in-memory database with the same settings.
///
/// # Errors
/// Returns an error if configuration SQL fails to execute.
pub fn open_in_memory() -> Result<Connection, ::duckdb::Error> {
    let connection = Connection::open_in_memory()?;
    configure_connection(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_connection_accepts_queries() {
        let connection = open_in_memory().expect("open");
        let one: i64 = connection
            .query_row("SELECT 1", [], |row| row.get(0))
            .expect("query");
        assert_eq!(one, 1);
    }
}
