//! Integration tests for the identifier store backends

use std::path::PathBuf;

use sqlal::{
    config::{AppConfig, StateConfig},
    models::IdentifierSet,
    persistence::{FileIdentifierStore, SqliteIdentifierStore, open_store, traits::IdentifierStore},
};

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let store = FileIdentifierStore::new(dir.path()).await.unwrap();
    store.save("Orders", &IdentifierSet::from([5, 7])).await.unwrap();
    drop(store);

    let reopened = FileIdentifierStore::new(dir.path()).await.unwrap();
    assert_eq!(reopened.load("Orders").await.unwrap(), IdentifierSet::from([5, 7]));
}

#[tokio::test]
async fn test_sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("state.db").display());

    let store = SqliteIdentifierStore::new(&url).await.unwrap();
    store.run_migrations().await.unwrap();
    store.save("Orders", &IdentifierSet::from([5, 7, 9])).await.unwrap();
    store.close().await;

    let reopened = SqliteIdentifierStore::new(&url).await.unwrap();
    reopened.run_migrations().await.unwrap();
    assert_eq!(reopened.load("Orders").await.unwrap(), IdentifierSet::from([5, 7, 9]));
    assert!(reopened.load("Jobs").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_open_store_defaults_to_processed_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::builder().config_dir(dir.path()).build();

    let store = open_store(&config).await.unwrap();
    store.save("Orders", &IdentifierSet::from([1])).await.unwrap();

    let expected = dir.path().join("processed").join("Orders_processed_ids.txt");
    assert_eq!(std::fs::read_to_string(expected).unwrap(), "1\n");
}

#[tokio::test]
async fn test_open_store_resolves_relative_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::builder()
        .config_dir(dir.path())
        .state(StateConfig::File { directory: Some(PathBuf::from("state/ids")) })
        .build();

    let store = open_store(&config).await.unwrap();
    store.save("Orders", &IdentifierSet::from([2])).await.unwrap();

    assert!(dir.path().join("state/ids/Orders_processed_ids.txt").is_file());
}

#[tokio::test]
async fn test_open_store_sqlite_backend() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("state.db").display());
    let config = AppConfig::builder()
        .config_dir(dir.path())
        .state(StateConfig::Sqlite { database_url: url })
        .build();

    let store = open_store(&config).await.unwrap();
    store.save("Orders", &IdentifierSet::from([3, 4])).await.unwrap();

    assert_eq!(store.load("Orders").await.unwrap(), IdentifierSet::from([3, 4]));
    assert!(dir.path().join("state.db").is_file());
}
