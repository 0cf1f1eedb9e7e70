use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What the player may see: cell states, board size and the mine counter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub size: Coord2,
    pub mines_remaining: i64,
    pub state: EngineState,
    pub cells: Array2<CellState>,
}

impl DisplaySnapshot {
    pub fn from_engine<G: MineGenerator>(engine: &BoardEngine<G>) -> Self {
        Self {
            size: engine.size(),
            mines_remaining: engine.mines_remaining(),
            state: engine.state(),
            cells: engine.cells().clone(),
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<CellState> {
        self.cells.get(coords.to_nd_index()).copied()
    }
}

/// Every cell's true value, for answer or debug display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerSnapshot {
    pub size: Coord2,
    pub values: Array2<CellValue>,
}

impl AnswerSnapshot {
    pub fn from_engine<G: MineGenerator>(engine: &BoardEngine<G>) -> Self {
        Self {
            size: engine.size(),
            values: engine.values().clone(),
        }
    }

    pub fn value(&self, coords: Coord2) -> Option<CellValue> {
        self.values.get(coords.to_nd_index()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(size: Coord2, mines: &[Coord2]) -> BoardEngine<MineLayout> {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        BoardEngine::with_generator(BoardConfig::new(size, 0.0), layout)
    }

    #[test]
    fn display_snapshot_maps_revealed_and_flagged_cells() {
        let mut engine = engine((2, 3), &[(0, 0)]);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();

        let snapshot = engine.snapshot_for_display();

        assert_eq!(snapshot.size, (2, 3));
        assert_eq!(snapshot.mines_remaining, 0);
        assert_eq!(snapshot.state, EngineState::Active);
        assert_eq!(snapshot.cell((1, 1)), Some(CellState::Revealed(CellValue::Safe(1))));
        assert_eq!(snapshot.cell((0, 0)), Some(CellState::Flagged));
        assert_eq!(snapshot.cell((0, 2)), Some(CellState::Hidden));
        assert_eq!(snapshot.cell((2, 0)), None);
    }

    #[test]
    fn snapshot_does_not_follow_later_moves() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        let snapshot = engine.snapshot_for_display();

        engine.reveal((1, 1)).unwrap();

        assert_eq!(snapshot.cell((1, 1)), Some(CellState::Hidden));
    }

    #[test]
    fn answer_snapshot_exposes_every_value() {
        let engine = engine((2, 3), &[(0, 0), (1, 2)]);
        let answers = engine.full_answer_snapshot();

        assert_eq!(answers.value((0, 0)), Some(CellValue::Mine));
        assert_eq!(answers.value((0, 1)), Some(CellValue::Safe(2)));
        assert_eq!(answers.value((1, 0)), Some(CellValue::Safe(1)));
        assert_eq!(answers.value((1, 2)), Some(CellValue::Mine));
    }

    #[test]
    fn snapshots_serialize_for_a_front_end() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.reveal((1, 1)).unwrap();

        let json = serde_json::to_string(&engine.snapshot_for_display()).unwrap();
        let restored: DisplaySnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, engine.snapshot_for_display());
    }
}
