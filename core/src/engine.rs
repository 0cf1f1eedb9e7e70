use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Regenerations tried by [`BoardEngine::ensure_safe_first_move`] before it places mines around the start
/// cell directly.
pub const MAX_SAFE_START_ATTEMPTS: u32 = 256;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Result of [`BoardEngine::consistency_check`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Consistency {
    pub consistent: bool,
    pub counted: CellCount,
    pub expected: CellCount,
}

/// Owns a mine layout, its value grid and the player-visible state of every cell.
///
/// The engine never refuses moves once the game is over; callers stop issuing them when
/// [`is_won`](Self::is_won) or [`is_lost`](Self::is_lost) report an end.
#[derive(Clone, Debug)]
pub struct BoardEngine<G = RandomMineGenerator> {
    config: BoardConfig,
    generator: G,
    layout: MineLayout,
    values: Array2<CellValue>,
    board: Array2<CellState>,
    flags_marked: CellCount,
    revealed_safe: CellCount,
    detonated: Option<Coord2>,
}

impl BoardEngine {
    pub fn new(config: BoardConfig) -> Self {
        Self::with_generator(config, RandomMineGenerator::from_entropy())
    }

    pub fn with_seed(config: BoardConfig, seed: u64) -> Self {
        Self::with_generator(config, RandomMineGenerator::new(seed))
    }

    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }
}

impl<G: MineGenerator> BoardEngine<G> {
    pub fn with_generator(config: BoardConfig, mut generator: G) -> Self {
        let layout = generator.generate(&config);
        let size = layout.size();
        Self {
            config,
            generator,
            values: layout.values(),
            layout,
            board: Array2::default(size.to_nd_index()),
            flags_marked: 0,
            revealed_safe: 0,
            detonated: None,
        }
    }

    /// Replaces the layout, the value grid and every cell state with a fresh board for `config`.
    pub fn generate(&mut self, config: BoardConfig) {
        self.config = config;
        let layout = self.generator.generate(&self.config);
        self.install_layout(layout);
    }

    /// Generates a fresh board with the current configuration.
    pub fn regenerate(&mut self) {
        self.generate(self.config);
    }

    fn install_layout(&mut self, layout: MineLayout) {
        self.values = layout.values();
        self.board = Array2::default(layout.size().to_nd_index());
        self.layout = layout;
        self.flags_marked = 0;
        self.revealed_safe = 0;
        self.detonated = None;
    }

    /// Regenerates the board until `coords` has no mine around it, then reveals it.
    ///
    /// Meant for the very first move only: any regeneration discards all previous cell states, and a
    /// flag on `coords` itself is cleared before revealing.
    /// After [`MAX_SAFE_START_ATTEMPTS`] unlucky layouts the generator is asked for a layout that
    /// keeps the start neighbourhood clear, which is the same distribution as retrying forever.
    pub fn ensure_safe_first_move(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.layout.validate_coords(coords)?;

        let mut region: Vec<Coord2> = self.layout.iter_neighbors(coords).collect();
        region.push(coords);
        let free_cells = self.layout.total_cells() - region.len() as CellCount;
        if self.layout.mine_count() > free_cells {
            return Err(EngineError::NoSafeStart { coords });
        }

        let mut attempts = 0;
        while !self.values[coords.to_nd_index()].is_zero() {
            if attempts == MAX_SAFE_START_ATTEMPTS {
                log::warn!(
                    "No zero at {coords:?} after {attempts} layouts, keeping its neighbourhood clear"
                );
                let layout = self
                    .generator
                    .generate_clear_of(&self.config, &region)
                    .ok_or(EngineError::NoSafeStart { coords })?;
                self.install_layout(layout);
                break;
            }
            self.regenerate();
            attempts += 1;
        }
        log::debug!("Safe start at {coords:?} after {attempts} regenerations");

        if !self.values[coords.to_nd_index()].is_zero() {
            return Err(EngineError::NoSafeStart { coords });
        }
        if self.board[coords.to_nd_index()].is_flagged() {
            self.set_flag(coords, false);
        }
        self.reveal(coords)
    }

    /// Reveals a cell, flooding through zero cells. Flagged cells are left alone and revealing an
    /// already revealed cell reveals its surroundings instead.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use CellState::*;

        let coords = self.layout.validate_coords(coords)?;

        match self.board[coords.to_nd_index()] {
            Hidden => {
                let mut outcome = self.open_cell(coords);
                if self.values[coords.to_nd_index()].is_zero() {
                    outcome = outcome | self.flood_from(coords);
                }
                Ok(self.settle(outcome))
            }
            Revealed(_) => self.reveal_surrounding(coords),
            Flagged | IncorrectFlag => Ok(RevealOutcome::NoChange),
        }
    }

    /// Reveals every hidden neighbour of a revealed cell, flooding onwards from the zero ones.
    ///
    /// Flags are respected but not counted: an unflagged mine next to `coords` is revealed.
    pub fn reveal_surrounding(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.layout.validate_coords(coords)?;

        if self.board[coords.to_nd_index()].is_unrevealed() {
            return Err(EngineError::InvalidChordTarget { coords });
        }

        let outcome = self.flood_from(coords);
        Ok(self.settle(outcome))
    }

    /// Opens the hidden neighbours of `origin`, and transitively those of every zero cell opened.
    fn flood_from(&mut self, origin: Coord2) -> RevealOutcome {
        let mut outcome = RevealOutcome::NoChange;
        let mut pending = vec![origin];
        let mut opened = 0usize;

        while let Some(coords) = pending.pop() {
            for neighbor in self.layout.iter_neighbors(coords) {
                if self.board[neighbor.to_nd_index()] != CellState::Hidden {
                    continue;
                }

                outcome = outcome | self.open_cell(neighbor);
                opened += 1;

                if self.values[neighbor.to_nd_index()].is_zero() {
                    pending.push(neighbor);
                }
            }
        }

        log::trace!("Flood from {origin:?} opened {opened} cells");
        outcome
    }

    fn open_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let value = self.values[coords.to_nd_index()];
        self.board[coords.to_nd_index()] = CellState::Revealed(value);

        if value.is_mine() {
            self.detonated.get_or_insert(coords);
            RevealOutcome::HitMine
        } else {
            self.revealed_safe += 1;
            RevealOutcome::Revealed
        }
    }

    fn settle(&self, outcome: RevealOutcome) -> RevealOutcome {
        if outcome == RevealOutcome::Revealed && self.is_won() {
            RevealOutcome::Won
        } else {
            outcome
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use CellState::*;

        let coords = self.layout.validate_coords(coords)?;

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => self.set_flag(coords, true),
            Flagged => self.set_flag(coords, false),
            Revealed(_) | IncorrectFlag => MarkOutcome::NoChange,
        })
    }

    pub fn flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.layout.validate_coords(coords)?;

        Ok(match self.board[coords.to_nd_index()] {
            CellState::Hidden => self.set_flag(coords, true),
            _ => MarkOutcome::NoChange,
        })
    }

    pub fn unflag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.layout.validate_coords(coords)?;

        Ok(match self.board[coords.to_nd_index()] {
            CellState::Flagged => self.set_flag(coords, false),
            _ => MarkOutcome::NoChange,
        })
    }

    fn set_flag(&mut self, coords: Coord2, flagged: bool) -> MarkOutcome {
        if flagged {
            self.board[coords.to_nd_index()] = CellState::Flagged;
            self.flags_marked += 1;
        } else {
            self.board[coords.to_nd_index()] = CellState::Hidden;
            self.flags_marked -= 1;
        }
        MarkOutcome::Changed
    }

    /// Dispatches `action` at `coords`, returning whether anything changed.
    pub fn apply(&mut self, action: Action, coords: Coord2) -> Result<bool> {
        use Action::*;

        Ok(match action {
            Reveal => self.reveal(coords)?.has_update(),
            RevealSurrounding => self.reveal_surrounding(coords)?.has_update(),
            Flag => self.flag(coords)?.has_update(),
            Unflag => self.unflag(coords)?.has_update(),
            ToggleFlag => self.toggle_flag(coords)?.has_update(),
        })
    }

    /// Applies `action` to each coordinate in order, stopping at the first error.
    ///
    /// Moves applied before the error are kept.
    pub fn apply_all<I>(&mut self, action: Action, coords: I) -> Result<bool>
    where
        I: IntoIterator<Item = Coord2>,
    {
        let mut updated = false;
        for coords in coords {
            updated |= self.apply(action, coords)?;
        }
        Ok(updated)
    }

    /// Whether every safe cell is revealed. Flags on mines play no part.
    pub fn is_won(&self) -> bool {
        self.revealed_safe == self.layout.safe_cell_count()
    }

    /// Whether any mine has been revealed.
    pub fn is_lost(&self) -> bool {
        self.detonated.is_some()
    }

    pub fn state(&self) -> EngineState {
        if self.is_lost() {
            EngineState::Lost
        } else if self.is_won() {
            EngineState::Won
        } else if self.revealed_safe == 0 {
            EngineState::Ready
        } else {
            EngineState::Active
        }
    }

    /// Mines minus flags placed. Goes negative when the player over-flags.
    pub fn mines_remaining(&self) -> i64 {
        i64::from(self.layout.mine_count()) - i64::from(self.flags_marked)
    }

    /// Turns every flag sitting on a safe cell into [`CellState::IncorrectFlag`], for the final board.
    pub fn mark_incorrect_flags(&mut self) -> MarkOutcome {
        let mut marked = 0;
        for (cell, value) in self.board.iter_mut().zip(self.values.iter()) {
            if *cell == CellState::Flagged && !value.is_mine() {
                *cell = CellState::IncorrectFlag;
                marked += 1;
            }
        }
        log::debug!("Marked {marked} incorrect flags");

        if marked > 0 {
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        }
    }

    /// Counts the mines actually laid and compares them with what the configuration asks for.
    pub fn consistency_check(&self) -> Consistency {
        let (rows, cols) = self.layout.size();
        let counted = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .filter(|&coords| self.layout.contains_mine(coords))
            .count() as CellCount;
        let expected = self.config.mine_count();

        Consistency {
            consistent: counted == expected,
            counted,
            expected,
        }
    }

    pub fn snapshot_for_display(&self) -> DisplaySnapshot {
        DisplaySnapshot::from_engine(self)
    }

    pub fn full_answer_snapshot(&self) -> AnswerSnapshot {
        AnswerSnapshot::from_engine(self)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn size(&self) -> Coord2 {
        self.layout.size()
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn mine_count(&self) -> CellCount {
        self.layout.mine_count()
    }

    pub fn flags_marked(&self) -> CellCount {
        self.flags_marked
    }

    /// First mine revealed, if any.
    pub fn detonated(&self) -> Option<Coord2> {
        self.detonated
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellState> {
        let coords = self.layout.validate_coords(coords)?;
        Ok(self.board[coords.to_nd_index()])
    }

    pub fn value_at(&self, coords: Coord2) -> Result<CellValue> {
        let coords = self.layout.validate_coords(coords)?;
        Ok(self.values[coords.to_nd_index()])
    }

    pub(crate) fn cells(&self) -> &Array2<CellState> {
        &self.board
    }

    pub(crate) fn values(&self) -> &Array2<CellValue> {
        &self.values
    }
}
