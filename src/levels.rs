//! Level loading: `levels/level<N>.txt`, one level per file, `N` in
//! `[0, MAX_LEVEL]`. Adapted from the teacher's XSB multi-level-per-file
//! parser (`Levels::from_text` splitting on blank/`;` lines) down to a
//! single-level-per-call reader, per
//! `original_source/game/game.py::_load_level`'s one-file-per-level
//! convention; the teacher's `LevelError`/`Display`/`From` shape is kept
//! as-is.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::board::Grid;
use crate::state::SokobanState;

/// Highest valid level index, inclusive. `original_source/game/game.py`
/// ships levels `level0.txt` through `level20.txt`.
pub const MAX_LEVEL: usize = 20;

#[derive(Debug)]
pub enum LevelError {
    Io(io::Error),
    InvalidLevel(String),
    OutOfRange(usize),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(err) => write!(f, "IO error: {}", err),
            LevelError::InvalidLevel(msg) => write!(f, "Invalid level: {}", msg),
            LevelError::OutOfRange(n) => {
                write!(f, "level {} out of range 0..={}", n, MAX_LEVEL)
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LevelError {
    fn from(err: io::Error) -> Self {
        LevelError::Io(err)
    }
}

impl From<String> for LevelError {
    fn from(err: String) -> Self {
        LevelError::InvalidLevel(err)
    }
}

/// Where level files are read from; defaults to `levels/`, but the
/// benchmark harness and tests can point this at a scratch directory.
pub struct LevelSet {
    dir: PathBuf,
}

impl LevelSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LevelSet { dir: dir.into() }
    }

    pub fn default_dir() -> Self {
        LevelSet::new("levels")
    }

    fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("level{}.txt", index))
    }

    /// Load and parse `level<index>.txt`.
    pub fn load(&self, index: usize) -> Result<SokobanState, LevelError> {
        if index > MAX_LEVEL {
            return Err(LevelError::OutOfRange(index));
        }
        let path = self.path_for(index);
        let text = fs::read_to_string(&path)?;
        parse_level(&text)
    }
}

fn parse_level(text: &str) -> Result<SokobanState, LevelError> {
    let grid = Grid::from_text(text).map_err(|e| LevelError::InvalidLevel(e.to_string()))?;
    Ok(SokobanState::from_grid(&grid))
}

/// Parse a level directly from a path, bypassing the `levels/level<N>.txt`
/// naming convention — used by the benchmark harness when given an
/// explicit directory and by callers outside the standard layout.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SokobanState, LevelError> {
    let text = fs::read_to_string(path)?;
    parse_level(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_parses_valid_level() {
        let dir = std::env::temp_dir().join(format!("sokoban_core_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut f = fs::File::create(dir.join("level0.txt")).unwrap();
        writeln!(f, "#####\n#@$.#\n#####").unwrap();

        let set = LevelSet::new(&dir);
        let state = set.load(0).unwrap();
        assert!(!state.is_goal_state());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rejects_out_of_range_index() {
        let set = LevelSet::new("levels");
        let err = set.load(MAX_LEVEL + 1).unwrap_err();
        assert!(matches!(err, LevelError::OutOfRange(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = std::env::temp_dir().join(format!("sokoban_core_missing_{}", std::process::id()));
        let set = LevelSet::new(&dir);
        let err = set.load(1).unwrap_err();
        assert!(matches!(err, LevelError::Io(_)));
    }

    #[test]
    fn test_load_invalid_level_text() {
        let dir = std::env::temp_dir().join(format!("sokoban_core_invalid_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut f = fs::File::create(dir.join("level0.txt")).unwrap();
        writeln!(f, "#####\n#@@.#\n#####").unwrap();

        let set = LevelSet::new(&dir);
        let err = set.load(0).unwrap_err();
        assert!(matches!(err, LevelError::InvalidLevel(_)));

        fs::remove_dir_all(&dir).ok();
    }
}
