use serde::{Deserialize, Serialize};

/// True content of a cell, fixed for the lifetime of a generated layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Mine,
    /// Number of mined neighbours, `0..=8`.
    Safe(u8),
}

impl CellValue {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Safe(0))
    }
}

/// Canonical player-visible state stored by the board engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Revealed(CellValue),
    /// A flag that turned out to sit on a safe cell, only set once the game is over.
    IncorrectFlag,
}

impl CellState {
    pub const fn is_unrevealed(self) -> bool {
        !self.is_revealed()
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}
