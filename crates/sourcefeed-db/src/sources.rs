//! Record store for [`Source`] rows.
//!
//! Reads ([`find_all`], [`find_by_id`]) serve the query side. Writes
//! ([`delete_all`], [`save`]) are only used by the startup bootstrap in
//! [`seed_sources`].

use rusqlite::{params, Connection, OptionalExtension};
use sourcefeed_types::Source;

use crate::error::StoreError;

/// Returns every source in the store.
///
/// Rows come back in insertion order, but callers must treat the result as
/// an unordered set.
///
/// # Errors
///
/// Returns `StoreError::Database` on SQL failure.
pub fn find_all(conn: &Connection) -> Result<Vec<Source>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name FROM sources ORDER BY rowid ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Source {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut sources = Vec::new();
    for row in rows {
        sources.push(row?);
    }
    Ok(sources)
}

/// Looks up a single source by its identifier.
///
/// Returns `Ok(None)` when no row has that key.
///
/// # Errors
///
/// Returns `StoreError::Database` on SQL failure.
pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Source>, StoreError> {
    let source = conn
        .query_row(
            "SELECT id, name FROM sources WHERE id = ?1",
            params![id],
            |row| {
                Ok(Source {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(source)
}

/// Removes every source. Returns the number of rows deleted.
///
/// # Errors
///
/// Returns `StoreError::Database` on SQL failure.
pub fn delete_all(conn: &Connection) -> Result<usize, StoreError> {
    Ok(conn.execute("DELETE FROM sources", [])?)
}

/// Inserts `source`, replacing any existing row with the same id.
///
/// # Errors
///
/// Returns `StoreError::Database` on SQL failure.
pub fn save(conn: &Connection, source: &Source) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO sources (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        params![source.id, source.name],
    )?;
    Ok(())
}

/// Replaces the store contents with one freshly identified source per name.
///
/// The delete and the inserts run in one transaction, so running the
/// bootstrap twice still leaves exactly one row per name and a failure
/// leaves the previous contents untouched.
///
/// # Errors
///
/// Returns `StoreError::Database` if any statement fails.
pub fn seed_sources<S: AsRef<str>>(
    conn: &Connection,
    names: &[S],
) -> Result<Vec<Source>, StoreError> {
    let tx = conn.unchecked_transaction()?;

    let removed = delete_all(&tx)?;
    if removed > 0 {
        tracing::debug!(removed, "cleared existing sources before seeding");
    }

    let mut seeded = Vec::with_capacity(names.len());
    for name in names {
        let source = Source::with_random_id(name.as_ref());
        save(&tx, &source)?;
        tracing::info!(source = %source, "seeded source");
        seeded.push(source);
    }

    tx.commit()?;
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        crate::run_migrations(&conn).expect("migrations should succeed");
        conn
    }

    #[test]
    fn find_by_id_hits_and_misses() {
        let conn = test_db();
        save(&conn, &Source::new("a", "Pressure")).expect("save should succeed");

        let found = find_by_id(&conn, "a").expect("lookup should succeed");
        assert_eq!(found, Some(Source::new("a", "Pressure")));

        let missing = find_by_id(&conn, "z").expect("lookup should succeed");
        assert_eq!(missing, None);
    }

    #[test]
    fn find_all_on_empty_store() {
        let conn = test_db();
        assert!(find_all(&conn).expect("query should succeed").is_empty());
    }

    #[test]
    fn find_all_returns_inserted_and_not_deleted() {
        let conn = test_db();
        save(&conn, &Source::new("a", "Pressure")).unwrap();
        save(&conn, &Source::new("b", "Heat")).unwrap();
        conn.execute("DELETE FROM sources WHERE id = 'a'", []).unwrap();
        save(&conn, &Source::new("c", "Rotation")).unwrap();

        let ids: HashSet<String> = find_all(&conn)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, HashSet::from(["b".to_string(), "c".to_string()]));
    }

    #[test]
    fn save_same_id_overwrites_name() {
        let conn = test_db();
        save(&conn, &Source::new("a", "Pressure")).unwrap();
        save(&conn, &Source::new("a", "Barometric")).unwrap();

        let all = find_all(&conn).unwrap();
        assert_eq!(all, vec![Source::new("a", "Barometric")]);
    }

    #[test]
    fn delete_all_reports_removed_rows() {
        let conn = test_db();
        save(&conn, &Source::new("a", "Pressure")).unwrap();
        save(&conn, &Source::new("b", "Heat")).unwrap();

        assert_eq!(delete_all(&conn).unwrap(), 2);
        assert_eq!(delete_all(&conn).unwrap(), 0);
    }

    #[test]
    fn seeding_twice_keeps_one_row_per_name() {
        let conn = test_db();
        let names = ["Pressure", "Temperature", "Heat"];

        let first = seed_sources(&conn, names.as_slice()).expect("first seed should succeed");
        let second = seed_sources(&conn, names.as_slice()).expect("second seed should succeed");
        assert_eq!(first.len(), 3);

        let stored = find_all(&conn).unwrap();
        assert_eq!(stored.len(), 3);

        // The second run issued new ids and removed the old ones.
        for old in &first {
            assert_eq!(find_by_id(&conn, &old.id).unwrap(), None);
        }
        let stored_ids: HashSet<_> = stored.iter().map(|s| s.id.clone()).collect();
        let second_ids: HashSet<_> = second.iter().map(|s| s.id.clone()).collect();
        assert_eq!(stored_ids, second_ids);

        let mut stored_names: Vec<_> = stored.into_iter().map(|s| s.name).collect();
        stored_names.sort();
        assert_eq!(stored_names, vec!["Heat", "Pressure", "Temperature"]);
    }

    #[test]
    fn seeding_with_no_names_empties_the_store() {
        let conn = test_db();
        save(&conn, &Source::new("a", "Pressure")).unwrap();

        let seeded = seed_sources::<&str>(&conn, &[]).unwrap();
        assert!(seeded.is_empty());
        assert!(find_all(&conn).unwrap().is_empty());
    }
}
