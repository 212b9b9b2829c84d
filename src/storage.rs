use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::ui::Theme;

const DATA_DIR_ENV: &str = "STOPWATCH_DATA_DIR";
const APP_DIR: &str = "stopwatch";
const FALLBACK_DIR: &str = ".stopwatch";
const KEY_THEME: &str = "theme";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage I/O failed for {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed value for {key:?}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where preferences and the log file live.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
}

/// Local key-value store: one JSON document per key.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    pub fn set_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let data = serde_json::to_vec(value).map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })?;
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        fs::write(path, data).map_err(io_err)
    }

    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key)?;
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Typed preferences on top of `Storage`. Failures are logged, never fatal.
pub struct TimerStorage {
    store: Storage,
}

impl TimerStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            store: Storage::new(root),
        }
    }

    pub fn load_theme(&self) -> Theme {
        match self.store.get_item::<Theme>(KEY_THEME) {
            Ok(Some(theme)) => theme,
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("Failed to load theme, using default: {}", e);
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) {
        if let Err(e) = self.store.set_item(KEY_THEME, &theme) {
            log::error!("Failed to save theme: {}", e);
        }
    }

    /// Drop the stored theme so the next launch starts from the default.
    pub fn forget_theme(&self) {
        if let Err(e) = self.store.remove_item(KEY_THEME) {
            log::error!("Failed to forget theme: {}", e);
        }
    }
}
