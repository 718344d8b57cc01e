use phonebook_core::domain::ErrorRecord;
use phonebook_store::Store;

#[test]
fn error_logs_append_and_list_recent_first() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");

    for (index, message) in ["first", "second", "third"].iter().enumerate() {
        store
            .error_logs()
            .append(&ErrorRecord {
                occurred_at: format!("2030-01-15T12:00:0{index}+00:00"),
                message: message.to_string(),
                input: r#"{"phone":"0712345678"}"#.to_string(),
            })
            .expect("append");
    }

    let entries = store.error_logs().list_recent(2).expect("list");
    let messages: Vec<&str> = entries
        .iter()
        .map(|entry| entry.record.message.as_str())
        .collect();
    assert_eq!(messages, vec!["third", "second"]);
    assert_eq!(entries[0].record.input, r#"{"phone":"0712345678"}"#);
}
