//! Versioned schema scripts for the attendance store.
//!
//! Scripts are embedded at compile time and run in ascending version order
//! inside a single transaction, after which `user_version` is bumped to the
//! last applied version.
//!
//! # Schema history
//! - v1: `subjects` and `attendance_records` with the one-record-per-date
//!   constraint.
//! - v2: history index `(subject_id, date DESC)` for the newest-first lists.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "record_history_index",
        sql: include_str!("0002_record_history_index.sql"),
    },
];

/// Schema version this binary migrates stores up to.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the store on `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is newer than this binary.
/// - `Migration` naming the first script that failed; earlier scripts of the
///   same run are rolled back with it.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    run_pending(conn, MIGRATIONS)
}

fn run_pending(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let from: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let target = migrations.last().map_or(0, |migration| migration.version);

    if from > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: target,
        });
    }
    if from == target {
        debug!("event=db_migrate module=db status=skip version={from}");
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in migrations.iter().filter(|m| m.version > from) {
        debug!(
            "event=db_migrate module=db status=start version={} name={}",
            migration.version, migration.name
        );
        tx.execute_batch(migration.sql)
            .and_then(|_| {
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| DbError::Migration {
                version: migration.version,
                source,
            })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from={from} to={target}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{latest_version, run_pending, Migration, MIGRATIONS};
    use crate::db::DbError;
    use rusqlite::Connection;

    fn user_version(conn: &Connection) -> u32 {
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn versions_are_strictly_increasing_from_one() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1);
        }
        assert_eq!(latest_version(), MIGRATIONS.len() as u32);
    }

    #[test]
    fn failing_script_reports_its_version_and_rolls_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        let scripts = [
            Migration {
                version: 1,
                name: "ok",
                sql: "CREATE TABLE kept (id INTEGER);",
            },
            Migration {
                version: 2,
                name: "broken",
                sql: "CREATE TABLE oops (",
            },
        ];

        let err = run_pending(&mut conn, &scripts).unwrap_err();
        assert!(matches!(err, DbError::Migration { version: 2, .. }));
        assert!(err.to_string().contains("migration v2"));

        assert_eq!(user_version(&conn), 0);
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'kept';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn only_scripts_above_current_version_run() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 1;").unwrap();
        let scripts = [
            Migration {
                version: 1,
                name: "already_applied",
                sql: "CREATE TABLE broken (",
            },
            Migration {
                version: 2,
                name: "next",
                sql: "CREATE TABLE added (id INTEGER);",
            },
        ];

        run_pending(&mut conn, &scripts).unwrap();
        assert_eq!(user_version(&conn), 2);
    }
}
