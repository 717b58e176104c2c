use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespaced key the language code is persisted under.
pub const LANGUAGE_KEY: &str = "ayahhub-lang";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to read preferences '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write preferences '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Durable key-value storage behind the preference store.
pub trait PreferenceBackend: Send + Sync {
    /// Persisted language code, if any.
    fn load_language(&self) -> Result<Option<String>, PreferenceError>;

    /// Persist `code`. Must be durable when this returns.
    fn save_language(&self, code: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedPreferences {
    #[serde(rename = "ayahhub-lang", default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

/// TOML file backend.
///
/// Writes take an exclusive advisory lock so two processes never interleave
/// partial files.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<PersistedPreferences, PreferenceError> {
        if !self.path.exists() {
            return Ok(PersistedPreferences::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| PreferenceError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| PreferenceError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl PreferenceBackend for FileBackend {
    fn load_language(&self) -> Result<Option<String>, PreferenceError> {
        Ok(self.read()?.language.filter(|code| !code.trim().is_empty()))
    }

    fn save_language(&self, code: &str) -> Result<(), PreferenceError> {
        let write_err = |e| PreferenceError::Write {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = toml::to_string(&PersistedPreferences {
            language: Some(code.to_string()),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(write_err)?;

        file.lock_exclusive().map_err(write_err)?;
        let result = file
            .set_len(0)
            .and_then(|_| file.write_all(content.as_bytes()))
            .and_then(|_| file.sync_all());
        let _ = FileExt::unlock(&file);
        result.map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), language = code, "Saved language preference");
        Ok(())
    }
}

/// Process-local backend, nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    language: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(code: &str) -> Self {
        Self {
            language: Mutex::new(Some(code.to_string())),
        }
    }
}

impl PreferenceBackend for MemoryBackend {
    fn load_language(&self) -> Result<Option<String>, PreferenceError> {
        Ok(self.language.lock().clone())
    }

    fn save_language(&self, code: &str) -> Result<(), PreferenceError> {
        *self.language.lock() = Some(code.to_string());
        Ok(())
    }
}
