use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Coordinates {coords:?} are outside of the {size:?} board")]
    OutOfBounds { coords: Coord2, size: Coord2 },
    #[error("Cell {coords:?} is not revealed, only revealed cells can reveal their surroundings")]
    InvalidChordTarget { coords: Coord2 },
    #[error("Cell {coords:?} can never have zero adjacent mines with this many mines")]
    NoSafeStart { coords: Coord2 },
}

pub type Result<T> = core::result::Result<T, EngineError>;
