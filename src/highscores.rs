//! Persist the high score to disk (XDG config or ~/.config/tilemerge).

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "tilemerge";
const FILENAME: &str = "highscore";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no config directory (HOME and XDG_CONFIG_HOME unset)")]
    NoConfigDir,
}

/// Get/set store for the best score.
pub trait HighScoreStore {
    /// Stored best score; 0 when nothing was saved yet.
    fn load(&self) -> Result<u64, StoreError>;
    fn save(&mut self, score: u64) -> Result<(), StoreError>;
}

/// Returns the path to the high score file (config dir / tilemerge / highscore).
fn config_path() -> Result<PathBuf, StoreError> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .map_err(|_| StoreError::NoConfigDir)?,
    };
    Ok(base.join(APP_DIR).join(FILENAME))
}

/// Single integer in a text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default config location.
    pub fn default_location() -> Result<Self, StoreError> {
        config_path().map(Self::new)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl HighScoreStore for FileStore {
    /// Missing file or unparsable content reads as 0.
    fn load(&self) -> Result<u64, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .next()
            .and_then(|l| l.trim().parse::<u64>().ok())
            .unwrap_or(0))
    }

    /// Creates the config directory if needed.
    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{score}\n"))?;
        Ok(())
    }
}

/// Keeps the score in memory only (`--no-save`, tests).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub score: u64,
}

impl MemoryStore {
    #[cfg(test)]
    pub fn with_score(score: u64) -> Self {
        Self { score }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u64, StoreError> {
        Ok(self.score)
    }

    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        self.score = score;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tilemerge-test-{}-{}", std::process::id(), name))
            .join(FILENAME)
    }

    #[test]
    fn test_file_store_missing_reads_zero() {
        let store = FileStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_file_store_roundtrip_creates_dir() {
        let path = temp_path("roundtrip");
        let mut store = FileStore::new(path.clone());
        store.save(1234).unwrap();
        assert_eq!(store.load().unwrap(), 1234);
        assert_eq!(fs::read_to_string(&path).unwrap(), "1234\n");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_garbage_reads_zero() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not a number").unwrap();
        assert_eq!(FileStore::new(path.clone()).load().unwrap(), 0);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_memory_store_keeps_last_save() {
        let mut store = MemoryStore::with_score(10);
        assert_eq!(store.load().unwrap(), 10);
        store.save(20).unwrap();
        assert_eq!(store.load().unwrap(), 20);
    }
}
