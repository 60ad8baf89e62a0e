//! Schema versioning for preppy.
//!
//! Each schema version is a list of statements from [`super::schema`].
//! Opening a database applies every version above the one recorded in the
//! `metadata` table, each inside its own transaction.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{
    CATALOG_STATEMENTS, CHECKLIST_STATEMENTS, CONTACT_STATEMENTS, CREATE_METADATA_TABLE,
    HEALTH_STATEMENTS, MEETUP_STATEMENTS, ROUTINE_STATEMENTS,
};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Statements introduced by each version, starting at version 1.
const MIGRATIONS: &[&[&str]] = &[
    CATALOG_STATEMENTS,
    CHECKLIST_STATEMENTS,
    CONTACT_STATEMENTS,
    HEALTH_STATEMENTS,
    ROUTINE_STATEMENTS,
    MEETUP_STATEMENTS,
];

/// The current schema version.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const CURRENT_VERSION: i32 = MIGRATIONS.len() as i32;

/// Bring the database schema up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if the recorded version is unreadable or newer than
/// this build understands, or if a migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let version = get_schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for next in (version + 1)..=CURRENT_VERSION {
        run_migration(conn, next)?;
        info!("Migrated database schema to version {}", next);
    }

    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
pub(crate) fn get_schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Apply one version's statements and record it, atomically.
fn run_migration(conn: &Connection, version: i32) -> Result<()> {
    let statements = usize::try_from(version)
        .ok()
        .and_then(|v| v.checked_sub(1))
        .and_then(|idx| MIGRATIONS.get(idx))
        .ok_or_else(|| Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        })?;

    let tx = conn.unchecked_transaction()?;
    for statement in *statements {
        tx.execute(statement, [])?;
    }
    set_schema_version(&tx, version)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().expect("failed to create in-memory database")
    }

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_initialize_schema_creates_tables() {
        let conn = create_test_db();
        initialize_schema(&conn).expect("failed to initialize schema");

        for table in [
            "metadata",
            "disasters",
            "supplies",
            "households",
            "selections",
            "saved_supplies",
            "saved_tasks",
            "custom_items",
            "contacts",
            "medical_records",
            "providers",
            "routine_members",
            "routine_events",
            "meetup_points",
        ] {
            assert!(table_exists(&conn, table), "missing table {table}");
        }
    }

    #[test]
    fn test_initialize_schema_sets_version() {
        let conn = create_test_db();
        initialize_schema(&conn).expect("failed to initialize schema");

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_schema_idempotent() {
        let conn = create_test_db();

        initialize_schema(&conn).expect("first init failed");
        initialize_schema(&conn).expect("second init failed");

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_upgrade_from_version_one() {
        let conn = create_test_db();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        run_migration(&conn, 1).unwrap();
        assert!(table_exists(&conn, "disasters"));
        assert!(!table_exists(&conn, "contacts"));

        initialize_schema(&conn).unwrap();
        assert!(table_exists(&conn, "contacts"));
        assert!(table_exists(&conn, "meetup_points"));
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_upgrade_from_contacts_version_keeps_rows() {
        let conn = create_test_db();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        for version in 1..=3 {
            run_migration(&conn, version).unwrap();
        }
        conn.execute(
            "INSERT INTO contacts (user_id, first_name, phone) VALUES (1, 'Ana', '555-0100')",
            [],
        )
        .unwrap();

        initialize_schema(&conn).unwrap();
        assert!(table_exists(&conn, "medical_records"));
        assert!(table_exists(&conn, "routine_events"));
        let contacts: i64 = conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(contacts, 1);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = create_test_db();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        set_schema_version(&conn, CURRENT_VERSION + 1).unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_invalid_version_value() {
        let conn = create_test_db();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();
        conn.execute(
            "INSERT INTO metadata (key, value) VALUES ('schema_version', 'abc')",
            [],
        )
        .unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));
    }

    #[test]
    fn test_run_migration_unknown_version() {
        let conn = create_test_db();
        initialize_schema(&conn).unwrap();

        let err = run_migration(&conn, 999).unwrap_err();
        assert!(err.to_string().contains("unknown migration version"));
        let err = run_migration(&conn, 0).unwrap_err();
        assert!(err.to_string().contains("unknown migration version"));
    }
}
