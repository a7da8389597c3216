//! Database migrations
//!
//! Versions are tracked in `PRAGMA user_version`; each step runs in its own
//! transaction together with the version bump.

use crate::Result;
use rusqlite::Connection;

/// Migration steps in order; step `i` brings the schema to version `i + 1`
const MIGRATIONS: &[(&str, &str)] = &[(
    "client state",
    r#"
    CREATE TABLE IF NOT EXISTS client_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
)];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = index + 1;
        tracing::info!(version, name, "Running migration");

        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;"
        ))
        .inspect_err(|_| {
            let _ = conn.execute_batch("ROLLBACK;");
        })?;
    }

    Ok(())
}

fn schema_version(conn: &Connection) -> Result<usize> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(usize::try_from(version).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), MIGRATIONS.len());
    }

    #[test]
    fn test_client_state_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO client_state (key, value, updated_at) VALUES ('k', 'v', 'now')",
            [],
        )
        .unwrap();
    }
}
