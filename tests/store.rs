//! JSON file store integration tests: absent file, round trip, corruption,
//! whole-document replacement.

use paper_trader::persistence::{JsonFileStore, StoreError, UserStore};
use paper_trader::types::holding::Holding;
use paper_trader::types::user::{UserRecord, UserTable};
use rust_decimal::Decimal;

fn sample_table() -> UserTable {
    let mut alice = UserRecord::new("hash-a".to_string(), Decimal::from(97_500));
    alice.portfolio.insert(
        "SYM".to_string(),
        Holding::new(10, Decimal::from(250), "199.99".parse().unwrap()),
    );
    alice
        .transactions
        .push("Bought 10 shares of SYM at ₹250 each with stop-loss ₹199.99".to_string());
    let bob = UserRecord::new("hash-b".to_string(), Decimal::from(100_000));

    let mut table = UserTable::new();
    table.insert("bob@example.com".to_string(), bob);
    table.insert("alice@example.com".to_string(), alice);
    table
}

#[tokio::test]
async fn absent_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("users.json"));
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_load_save_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let store = JsonFileStore::new(&path);
    let table = sample_table();

    store.save(&table).await.unwrap();
    let first = std::fs::read(&path).unwrap();

    let reloaded = store.load().await.unwrap();
    assert_eq!(reloaded, table);

    store.save(&reloaded).await.unwrap();
    let second = std::fs::read(&path).unwrap();
    assert_eq!(first, second);

    let keys: Vec<_> = reloaded.keys().cloned().collect();
    assert_eq!(keys, vec!["alice@example.com", "bob@example.com"]);
}

#[tokio::test]
async fn document_has_expected_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let store = JsonFileStore::new(&path);
    store.save(&sample_table()).await.unwrap();

    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let alice = &json["alice@example.com"];
    assert_eq!(alice["password"], "hash-a");
    assert_eq!(alice["portfolio"]["SYM"]["shares"], 10);
    assert!(alice["portfolio"]["SYM"].get("stop_loss").is_some());
    assert_eq!(alice["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, b"{\"truncated\": ").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(matches!(store.load().await, Err(StoreError::Corrupt(_))));
}

#[tokio::test]
async fn save_replaces_whole_document_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("users.json");
    let store = JsonFileStore::new(&path);

    store.save(&sample_table()).await.unwrap();
    store.save(&UserTable::new()).await.unwrap();

    assert!(store.load().await.unwrap().is_empty());
    let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("users.json")]);
}

#[tokio::test]
async fn reads_documents_with_numeric_amounts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(
        &path,
        r#"{"old@example.com": {"password": "h", "balance": 100000, "portfolio": {}, "transactions": []}}"#,
    )
    .unwrap();

    let store = JsonFileStore::new(&path);
    let table = store.load().await.unwrap();
    assert_eq!(table["old@example.com"].balance, Decimal::from(100_000));
}
