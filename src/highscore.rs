use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

/// Best score across sessions, persisted as a small JSON document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HighScoreFile {
    #[serde(default = "format_version")]
    pub format_version: u32,
    pub high_score: u32,
}

fn format_version() -> u32 {
    FORMAT_VERSION
}

impl HighScoreFile {
    pub fn new(high_score: u32) -> Self {
        HighScoreFile {
            format_version: FORMAT_VERSION,
            high_score,
        }
    }

    pub fn get_default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pacman").map(|proj_dirs| {
            let mut path = proj_dirs.data_dir().to_path_buf();
            path.push("high_score.json");
            path
        })
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// A missing or unreadable file means no previous record.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::new(0),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable high score file"
                );
                Self::new(0)
            }
        }
    }
}

/// Remembers where the record lives and what was last written, so repeated
/// saves of the same score touch the disk only once.
#[derive(Debug)]
pub struct HighScoreStore {
    path: Option<PathBuf>,
    stored: u32,
}

impl HighScoreStore {
    pub fn open(path: Option<PathBuf>) -> Self {
        let stored = path
            .as_deref()
            .map(|p| HighScoreFile::load_or_default(p).high_score)
            .unwrap_or(0);
        HighScoreStore { path, stored }
    }

    pub fn high_score(&self) -> u32 {
        self.stored
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes `score` if it beats the stored record. Returns whether a write happened.
    pub fn save_if_higher(&mut self, score: u32) -> io::Result<bool> {
        if score <= self.stored {
            return Ok(false);
        }
        if let Some(path) = &self.path {
            HighScoreFile::new(score).write_atomic(path)?;
            tracing::info!(score, path = %path.display(), "high score saved");
        }
        self.stored = score;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("score.json");

        HighScoreFile::new(4210).write_atomic(&path).unwrap();
        assert!(path.exists());
        assert_eq!(HighScoreFile::load(&path).unwrap().high_score, 4210);

        let tmp_path = path.with_extension("json.tmp");
        assert!(!tmp_path.exists());
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let dir = tempdir().unwrap();
        let file = HighScoreFile::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(file.high_score, 0);
    }

    #[test]
    fn corrupt_file_reads_as_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("score.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(HighScoreFile::load(&path).is_err());
        assert_eq!(HighScoreFile::load_or_default(&path).high_score, 0);
    }

    #[test]
    fn older_files_without_version_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("score.json");
        fs::write(&path, r#"{"high_score": 777}"#).unwrap();
        let file = HighScoreFile::load(&path).unwrap();
        assert_eq!(file, HighScoreFile::new(777));
    }

    #[test]
    fn store_only_writes_improvements() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("score.json");
        HighScoreFile::new(500).write_atomic(&path).unwrap();

        let mut store = HighScoreStore::open(Some(path.clone()));
        assert_eq!(store.high_score(), 500);
        assert!(!store.save_if_higher(300).unwrap());
        assert!(!store.save_if_higher(500).unwrap());
        assert!(store.save_if_higher(650).unwrap());
        assert_eq!(HighScoreFile::load(&path).unwrap().high_score, 650);

        let reopened = HighScoreStore::open(Some(path));
        assert_eq!(reopened.high_score(), 650);
    }

    #[test]
    fn store_without_path_keeps_score_in_memory() {
        let mut store = HighScoreStore::open(None);
        assert!(store.save_if_higher(10).unwrap());
        assert_eq!(store.high_score(), 10);
        assert!(store.path().is_none());
    }
}
