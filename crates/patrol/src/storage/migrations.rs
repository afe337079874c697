//! Schema versioning for the slot store.
//!
//! The table layout version lives in `PRAGMA user_version`. Values stored in
//! slots are opaque at this level and never migrated.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::MIGRATIONS;

/// The schema version this build expects.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const CURRENT_VERSION: i32 = MIGRATIONS.len() as i32;

/// Bring the database schema up to [`CURRENT_VERSION`].
///
/// Each pending migration runs in its own transaction together with the
/// version bump.
///
/// # Errors
///
/// Returns an error if the stored version is newer than this build or a
/// migration fails.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    let version = schema_version(conn)?;

    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for target in (version + 1)..=CURRENT_VERSION {
        let index = usize::try_from(target - 1)
            .map_err(|_| Error::internal(format!("bad migration index {target}")))?;
        let tx = conn.transaction()?;
        tx.execute_batch(MIGRATIONS[index])?;
        tx.pragma_update(None, "user_version", target)?;
        tx.commit()?;
        debug!(version = target, "Applied schema migration");
    }

    Ok(())
}

/// Read the schema version; a fresh database reports 0.
pub(crate) fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().expect("failed to create in-memory database")
    }

    #[test]
    fn test_fresh_db_reports_version_zero() {
        let conn = create_test_db();
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_initialize_schema_creates_slots_table() {
        let mut conn = create_test_db();
        initialize_schema(&mut conn).expect("failed to initialize schema");

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='slots'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_schema_idempotent() {
        let mut conn = create_test_db();
        initialize_schema(&mut conn).expect("first init failed");
        initialize_schema(&mut conn).expect("second init failed");
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut conn = create_test_db();
        conn.pragma_update(None, "user_version", CURRENT_VERSION + 1)
            .unwrap();

        let err = initialize_schema(&mut conn).unwrap_err();
        assert!(matches!(err, Error::DatabaseMigration { .. }));
        assert!(err.to_string().contains("newer than supported"));
    }
}
