//! Language preference persistence and catalog loading.

mod common;

use std::sync::Arc;

use ayahhub::api::Direction;
use ayahhub::preferences::{
    fallback_languages, FileBackend, PreferenceBackend, PreferenceStore, LANGUAGE_KEY,
};
use common::mock_backend::{MockBackend, MockResponse};
use common::{api_client, free_port};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> PreferenceStore {
    let backend: Arc<dyn PreferenceBackend> =
        Arc::new(FileBackend::new(dir.path().join("preferences.toml")));
    PreferenceStore::open(backend, "ur")
}

#[test]
fn first_open_persists_default() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    assert_eq!(store.language(), "ur");

    let content = std::fs::read_to_string(dir.path().join("preferences.toml")).unwrap();
    assert!(content.contains(LANGUAGE_KEY));
    assert!(content.contains("\"ur\""));
}

#[test]
fn selection_survives_reopen() {
    let dir = TempDir::new().unwrap();
    file_store(&dir).set_language("en").unwrap();

    assert_eq!(file_store(&dir).language(), "en");
}

#[test]
fn every_builtin_language_survives_reopen() {
    for language in fallback_languages() {
        let dir = TempDir::new().unwrap();
        file_store(&dir).set_language(&language.code).unwrap();

        assert_eq!(file_store(&dir).language(), language.code);
    }
}

#[test]
fn corrupt_file_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("preferences.toml"), "not = [valid").unwrap();

    assert_eq!(file_store(&dir).language(), "ur");
}

#[tokio::test]
async fn subscribers_see_language_changes() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let mut rx = store.subscribe();

    store.set_language("ar").unwrap();
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), "ar");

    // Re-selecting the active code is not a change.
    store.set_language("ar").unwrap();
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn catalog_is_fetched_once() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(
        r#"{"languages":[{"code":"en","name":"English","nativeName":"English","direction":"ltr"},{"code":"ur","name":"Urdu","nativeName":"اردو","direction":"rtl"}]}"#,
    ))
    .await;
    let api = api_client(&mock.base_url());
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);

    assert!(!store.is_catalog_loaded());
    assert_eq!(store.ensure_catalog(api.as_ref()).await.len(), 2);
    assert_eq!(store.ensure_catalog(api.as_ref()).await.len(), 2);
    assert_eq!(mock.captured_requests().await.len(), 1);

    let current = store.current_language();
    assert_eq!(current.native_name, "اردو");
    assert_eq!(current.direction, Direction::Rtl);
}

#[tokio::test]
async fn unreachable_catalog_uses_builtin_languages() {
    let api = api_client(&format!("http://127.0.0.1:{}", free_port()));
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);

    let codes: Vec<String> = store
        .ensure_catalog(api.as_ref())
        .await
        .iter()
        .map(|l| l.code.clone())
        .collect();
    assert_eq!(codes, vec!["ar", "en", "ur"]);
    assert!(store.is_catalog_loaded());
}

#[test]
fn unknown_code_gets_placeholder_record() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.set_language("xx").unwrap();

    let current = store.current_language();
    assert_eq!(current.code, "xx");
    assert_eq!(current.name, "xx");
    assert_eq!(current.direction, Direction::Ltr);
}
