use sourcefeed_db::{create_pool, run_migrations, sources, DbRuntimeSettings};
use sourcefeed_types::Source;

#[test]
fn db_initialization_creates_only_expected_tables() {
    let pool = create_pool(
        ":memory:",
        DbRuntimeSettings {
            pool_max_size: 1,
            ..DbRuntimeSettings::default()
        },
    )
    .expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to run migrations");
    assert_eq!(applied, 1);

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(tables, vec!["_sourcefeed_migrations", "sources"]);
}

#[test]
fn sources_survive_reopening_the_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("sources.db");
    let path = path.to_str().expect("temp path should be utf-8");

    {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool");
        let conn = pool.get().expect("failed to get connection");
        run_migrations(&conn).expect("failed to run migrations");
        sources::save(&conn, &Source::new("a", "Pressure")).expect("failed to save");
    }

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to reopen pool");
    let conn = pool.get().expect("failed to get connection");
    assert_eq!(run_migrations(&conn).expect("failed to run migrations"), 0);

    let found = sources::find_by_id(&conn, "a").expect("lookup failed");
    assert_eq!(found, Some(Source::new("a", "Pressure")));
}
