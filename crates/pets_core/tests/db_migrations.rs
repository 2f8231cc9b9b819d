use pets_core::db::migrations::{latest_version, schema_version};
use pets_core::db::{open_db, open_db_in_memory, DbError};
use pets_core::{PetsConfig, SqliteStorage, StorageEngine};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_eq!(
        table_columns(&conn, "pets"),
        vec!["_id", "name", "breed", "gender", "weight"]
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelter.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO pets (name, gender, weight) VALUES ('Toto', 1, 7);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM pets;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_storage_persists_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let config = PetsConfig {
        db_path: dir.path().join("pets.db"),
        ..PetsConfig::default()
    };

    {
        let provider = config.open_provider().unwrap();
        provider.insert_dummy_pet().unwrap();
    }

    let provider = config.open_provider().unwrap();
    let pets = provider.list_pets().unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].name, "Toto");
}

#[test]
fn storage_open_failure_is_reported_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::file(dir.path().join("missing").join("pets.db"));
    assert!(!storage.is_open());

    assert!(storage.open_readable().is_err());
    assert!(!storage.is_open());
}

fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}
