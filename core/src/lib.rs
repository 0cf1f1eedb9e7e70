use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use snapshot::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod snapshot;
mod tile;
mod types;

/// Board dimensions and the fraction of cells that should hold a mine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub density: f64,
}

impl BoardConfig {
    /// Largest share of the board that may be mined, regardless of the requested density.
    pub const MAX_MINE_SHARE_DIVISOR: CellCount = 2;

    pub const fn new_unchecked(size: Coord2, density: f64) -> Self {
        Self { size, density }
    }

    pub fn new((rows, cols): Coord2, density: f64) -> Self {
        let size = (rows.max(1), cols.max(1));
        if size != (rows, cols) {
            log::warn!("Board size {rows}x{cols} clamped to {}x{}", size.0, size.1);
        }

        let clamped = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };
        if clamped != density {
            log::warn!("Mine density {density} clamped to {clamped}");
        }

        Self::new_unchecked(size, clamped)
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// `min(floor(cells * density), floor(cells / 2))`.
    pub fn mine_count(&self) -> CellCount {
        let total = self.total_cells();
        // float to int casts saturate, so negative or NaN densities request no mines
        let requested = (f64::from(total) * self.density).floor() as CellCount;
        requested.min(total / Self::MAX_MINE_SHARE_DIVISOR)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn empty(size: Coord2) -> Self {
        Self {
            mine_mask: Array2::default(size.to_nd_index()),
            mine_count: 0,
        }
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(EngineError::OutOfBounds { coords, size });
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(EngineError::OutOfBounds { coords, size })
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.mine_mask.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        // at most 8 neighbours
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn value_at(&self, coords: Coord2) -> CellValue {
        if self[coords] {
            CellValue::Mine
        } else {
            CellValue::Safe(self.adjacent_mine_count(coords))
        }
    }

    /// Derives the full value grid, recomputed every time a layout is generated.
    pub fn values(&self) -> Array2<CellValue> {
        Array2::from_shape_fn(self.mine_mask.dim(), |(row, col)| {
            self.value_at((row as Coord, col as Coord))
        })
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }

    pub(crate) fn place_mine(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.mine_mask[coords.to_nd_index()];
        if *cell {
            false
        } else {
            *cell = true;
            self.mine_count += 1;
            true
        }
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.mine_mask[(row as usize, col as usize)]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Player commands a front end can dispatch without knowing which engine method backs them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Reveal,
    RevealSurrounding,
    Flag,
    Unflag,
    ToggleFlag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_count_follows_density() {
        assert_eq!(BoardConfig::new((10, 10), 0.15).mine_count(), 15);
        assert_eq!(BoardConfig::new((9, 9), 0.1).mine_count(), 8);
    }

    #[test]
    fn mine_count_is_capped_at_half_the_board() {
        assert_eq!(BoardConfig::new((10, 10), 0.9).mine_count(), 50);
        assert_eq!(BoardConfig::new((3, 3), 1.0).mine_count(), 4);
        assert_eq!(BoardConfig::new((1, 1), 1.0).mine_count(), 0);
    }

    #[test]
    fn unchecked_out_of_range_density_is_still_bounded() {
        assert_eq!(BoardConfig::new_unchecked((4, 4), -0.5).mine_count(), 0);
        assert_eq!(BoardConfig::new_unchecked((4, 4), f64::NAN).mine_count(), 0);
        assert_eq!(BoardConfig::new_unchecked((4, 4), 3.0).mine_count(), 8);
    }

    #[test]
    fn new_clamps_size_and_density() {
        let config = BoardConfig::new((0, 5), 1.5);
        assert_eq!(config.size, (1, 5));
        assert_eq!(config.density, 1.0);

        assert_eq!(BoardConfig::new((2, 2), f64::NAN).density, 0.0);
    }

    #[test]
    fn layout_values_count_in_bounds_neighbors() {
        let layout = MineLayout::from_mine_coords((3, 4), &[(0, 0), (2, 3)]).unwrap();
        let values = layout.values();

        assert_eq!(values[(0, 0)], CellValue::Mine);
        assert_eq!(values[(0, 1)], CellValue::Safe(1));
        assert_eq!(values[(1, 1)], CellValue::Safe(1));
        assert_eq!(values[(1, 2)], CellValue::Safe(1));
        assert_eq!(values[(0, 3)], CellValue::Safe(0));
        assert_eq!(values[(2, 0)], CellValue::Safe(0));
        assert_eq!(values[(2, 3)], CellValue::Mine);
    }

    #[test]
    fn from_mine_coords_rejects_out_of_bounds() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(EngineError::OutOfBounds {
                coords: (2, 0),
                size: (2, 2)
            })
        );
    }

    #[test]
    fn layout_from_mask_keeps_mine_count_in_step() {
        let mut mask: Array2<bool> = Array2::default([2, 2]);
        mask[[0, 0]] = true;
        let layout = MineLayout::from_mine_mask(mask);
        assert_eq!(layout.mine_count(), 1);
        assert_eq!(layout.safe_cell_count(), 3);

        let mut engine = BoardEngine::with_generator(BoardConfig::new((2, 2), 0.0), layout);
        assert_eq!(engine.mines_remaining(), 1);
        assert!(engine.apply_all(Action::Reveal, [(0, 1), (1, 0), (1, 1)]).unwrap());
        assert!(engine.is_won());
    }

    #[test]
    fn place_mine_counts_each_cell_once() {
        let mut layout = MineLayout::empty((2, 2));
        assert!(layout.place_mine((1, 1)));
        assert!(!layout.place_mine((1, 1)));
        assert_eq!(layout.mine_count(), 1);
        assert_eq!(layout.safe_cell_count(), 3);
    }
}
