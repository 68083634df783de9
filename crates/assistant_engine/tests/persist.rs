use std::fs;

use assistant_core::{Settings, SourceIdentity};
use assistant_engine::{
    ensure_settings_dir, AtomicFileWriter, JsonFileSettingsStore, MemorySettingsStore,
    PersistError, SettingsStore,
};
use tempfile::TempDir;

#[test]
fn creates_missing_settings_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("settings");
    assert!(!new_dir.exists());
    ensure_settings_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("s.json", "{}").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "{}");

    let second = writer.write("s.json", "[]").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "[]");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("s.json", "{}").is_err());
    assert!(!file_path.with_file_name("s.json").exists());
}

#[test]
fn missing_settings_file_loads_defaults() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileSettingsStore::new(temp.path().to_path_buf());
    assert_eq!(store.load().unwrap(), Settings::default());
}

#[test]
fn saved_whitelist_survives_a_reload() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileSettingsStore::new(temp.path().to_path_buf());
    let mut settings = Settings::default();
    settings.toggle_whitelist(SourceIdentity::script("abc"));
    settings.enabled = false;

    store.save(&settings).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("\"JSR::abc\""));
    assert_eq!(store.load().unwrap(), settings);
}

#[test]
fn corrupt_settings_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileSettingsStore::new(temp.path().to_path_buf());
    fs::write(store.path(), "{ not json").unwrap();

    assert!(matches!(store.load(), Err(PersistError::Serialize(_))));
}

#[test]
fn memory_store_counts_saves() {
    let store = MemorySettingsStore::default();
    assert_eq!(store.load().unwrap(), Settings::default());

    let mut settings = Settings::default();
    settings.label_dedup = false;
    store.save(&settings).unwrap();

    assert_eq!(store.save_count(), 1);
    assert_eq!(store.saved(), Some(settings));
}
