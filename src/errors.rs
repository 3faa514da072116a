use std::fmt;
use std::io;

/// Error conditions surfaced by this crate.
///
/// `NoSolution` is intentionally absent here: an exhausted search is not an
/// error, it's an empty `Vec` (see `search.rs` / `bidirectional.rs`).
#[derive(Debug)]
pub enum SokobanError {
    /// The level text used an unrecognized character, had no player, no
    /// boxes, no goals, or a box/goal count mismatch.
    BadLevelFormat(String),
    /// Failure to read a level file from disk.
    Io(io::Error),
}

impl fmt::Display for SokobanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SokobanError::BadLevelFormat(msg) => write!(f, "bad level format: {}", msg),
            SokobanError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for SokobanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SokobanError::Io(err) => Some(err),
            SokobanError::BadLevelFormat(_) => None,
        }
    }
}

impl From<io::Error> for SokobanError {
    fn from(err: io::Error) -> Self {
        SokobanError::Io(err)
    }
}

impl From<String> for SokobanError {
    fn from(msg: String) -> Self {
        SokobanError::BadLevelFormat(msg)
    }
}
