use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Purely random generation strategy, reproducible from its seed.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    seed: u64,
    rng: SmallRng,
    placement: Placement,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
            placement: Placement::default(),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    fn place(&mut self, config: &BoardConfig, keep_clear: &Array2<bool>, free_cells: CellCount) -> MineLayout {
        let mine_count = config.mine_count().min(free_cells);
        let mut layout = MineLayout::empty(config.size);
        let (rows, cols) = config.size;

        match self.placement {
            Placement::Rejection => {
                while layout.mine_count() < mine_count {
                    let coords = (
                        self.rng.random_range(0..rows),
                        self.rng.random_range(0..cols),
                    );
                    if !keep_clear[coords.to_nd_index()] {
                        layout.place_mine(coords);
                    }
                }
            }
            Placement::Shuffle => {
                let mut candidates: Vec<Coord2> = (0..rows)
                    .flat_map(|row| (0..cols).map(move |col| (row, col)))
                    .filter(|&coords| !keep_clear[coords.to_nd_index()])
                    .collect();
                let (chosen, _) = candidates.partial_shuffle(&mut self.rng, mine_count as usize);
                for &coords in chosen.iter() {
                    layout.place_mine(coords);
                }
            }
        }

        // double check mine count
        if layout.mine_count() != config.mine_count() {
            log::warn!(
                "Generated layout count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mine_count()
            );
        }
        log::debug!(
            "Generated {}x{} layout with {} mines ({:?})",
            rows,
            cols,
            layout.mine_count(),
            self.placement
        );
        layout
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: &BoardConfig) -> MineLayout {
        let keep_clear = Array2::default(config.size.to_nd_index());
        self.place(config, &keep_clear, config.total_cells())
    }

    fn generate_clear_of(&mut self, config: &BoardConfig, region: &[Coord2]) -> Option<MineLayout> {
        let mut keep_clear: Array2<bool> = Array2::default(config.size.to_nd_index());
        for &coords in region {
            if coords.0 < config.rows() && coords.1 < config.cols() {
                keep_clear[coords.to_nd_index()] = true;
            }
        }
        let blocked = keep_clear.iter().filter(|&&cell| cell).count() as CellCount;
        let free_cells = config.total_cells() - blocked;

        if config.mine_count() > free_cells {
            log::warn!(
                "Cannot keep {} cells clear with {} mines on {} cells",
                blocked,
                config.mine_count(),
                config.total_cells()
            );
            return None;
        }

        Some(self.place(config, &keep_clear, free_cells))
    }
}
