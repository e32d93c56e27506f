//! The one piece of state that survives restarts: the selected mode.

use std::fs;
use std::path::PathBuf;

use crate::types::Mode;

/// File-backed store for the operator's mode preference.
pub struct ModeStore {
    path: PathBuf,
}

impl ModeStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the persisted preference. Missing or unparseable files mean no
    /// preference; never an error.
    pub fn load(&self) -> Option<Mode> {
        let contents = fs::read_to_string(&self.path).ok()?;
        Mode::parse(&contents)
    }

    pub fn save(&self, mode: Mode) -> std::io::Result<()> {
        fs::write(&self.path, mode.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModeStore::new(dir.path().join("mode"));

        assert!(store.load().is_none());

        store.save(Mode::Hard).unwrap();
        assert_eq!(store.load(), Some(Mode::Hard));

        store.save(Mode::Normal).unwrap();
        assert_eq!(store.load(), Some(Mode::Normal));
    }

    #[test]
    fn test_garbage_file_is_no_preference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mode");
        std::fs::write(&path, "nightmare").unwrap();

        let store = ModeStore::new(path);
        assert!(store.load().is_none());
    }
}
