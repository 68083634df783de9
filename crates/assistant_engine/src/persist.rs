use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use assistant_core::Settings;
use assistant_logging::{qra_info, LogCategory};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const SETTINGS_FILE_NAME: &str = "qr_assistant.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("settings directory missing or not writable: {0}")]
    SettingsDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("settings are not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the host keeps the assistant's settings.
pub trait SettingsStore: Send + Sync {
    /// Stored settings, or defaults when nothing was saved yet.
    fn load(&self) -> Result<Settings, PersistError>;

    fn save(&self, settings: &Settings) -> Result<(), PersistError>;
}

/// Ensure the settings directory exists and accepts new files.
pub fn ensure_settings_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::SettingsDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::SettingsDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::SettingsDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::SettingsDir(e.to_string()))?;
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file and rename, so readers never
/// see half a document.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_settings_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Settings kept as pretty JSON in a single file.
pub struct JsonFileSettingsStore {
    writer: AtomicFileWriter,
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(dir: PathBuf) -> Self {
        let path = dir.join(SETTINGS_FILE_NAME);
        Self {
            writer: AtomicFileWriter::new(dir),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Settings, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                qra_info!(LogCategory::System; "no settings at {}, using defaults", self.path.display());
                Ok(Settings::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(settings)?;
        self.writer.write(SETTINGS_FILE_NAME, &json)?;
        Ok(())
    }
}

/// Process-local store; what the host gives when persistence is unavailable.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: Mutex<Option<Settings>>,
    saves: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
            saves: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn saved(&self) -> Option<Settings> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, PersistError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<(), PersistError> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
