use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Source of mine layouts for a board engine.
pub trait MineGenerator {
    fn generate(&mut self, config: &BoardConfig) -> MineLayout;

    /// Generates a layout with no mine inside `region`, or `None` when the generator cannot honour it.
    fn generate_clear_of(&mut self, config: &BoardConfig, region: &[Coord2]) -> Option<MineLayout> {
        let _ = (config, region);
        None
    }
}

/// How mines are scattered over the free cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Pick random cells, retrying occupied ones. Expected time only, fine below the 50% cap.
    #[default]
    Rejection,
    /// Shuffle the free cells and take a prefix. Always one pass over the board.
    Shuffle,
}

/// A fixed layout replays itself on every generation.
impl MineGenerator for MineLayout {
    fn generate(&mut self, config: &BoardConfig) -> MineLayout {
        if self.size() != config.size {
            log::warn!(
                "Fixed layout of size {:?} used for a {:?} board",
                self.size(),
                config.size
            );
        }
        self.clone()
    }
}
