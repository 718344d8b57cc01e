use phonebook_store::Store;
use tempfile::TempDir;

#[test]
fn migrations_apply_once() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store.migrate().expect("migrate again");

    assert_eq!(store.schema_version().expect("schema version"), 1);
}

#[test]
fn migrations_refuse_newer_database() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
        .connection()
        .execute("UPDATE phonebook_schema SET version = 99;", [])
        .expect("bump version");

    let err = store.migrate().unwrap_err();
    assert!(err.to_string().contains("newer than available migrations"));
}

#[test]
fn connect_creates_file_database() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("data").join("phonebook.sqlite3");
    let url = format!("sqlite://{}", path.display());

    let store = Store::connect(&url).expect("connect");
    store.migrate().expect("migrate");
    assert!(path.exists());
}
