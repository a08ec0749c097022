use std::error;
use std::fmt::{self, Display, Formatter};

/// Errors reported by the map and by the team game store built on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Checked access (`at`, `at_mut`) on a key that is not in the map.
    NotFound,
    /// No game is recorded at this timestamp.
    GameNotFound(u64),
    /// A game is already recorded at this timestamp.
    DuplicateGame(u64),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::GameNotFound(date) => write!(f, "no game recorded at {}", date),
            Self::DuplicateGame(date) => write!(f, "a game is already recorded at {}", date),
        }
    }
}

impl error::Error for Error {}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
