//! Sparse index from live lattice positions to the balls standing on them.

use std::collections::HashMap;

use bbcs_core::{BallId, Position};

/// Position index over the live ball state.
///
/// The lattice is unbounded, so unlike a dense grid the index only stores
/// occupied points.
#[derive(Clone, Debug, Default)]
pub(crate) struct Occupancy {
    cells: HashMap<Position, BallId>,
}

impl Occupancy {
    /// Rebuilds the index from scratch using the provided placements.
    pub(crate) fn fill_with<I>(&mut self, placements: I)
    where
        I: IntoIterator<Item = (Position, BallId)>,
    {
        self.cells.clear();
        self.cells.extend(placements);
    }

    /// Returns the ball standing on the provided position, if any.
    pub(crate) fn occupant(&self, position: Position) -> Option<BallId> {
        self.cells.get(&position).copied()
    }

    pub(crate) fn occupy(&mut self, ball: BallId, position: Position) {
        let _ = self.cells.insert(position, ball);
    }

    pub(crate) fn vacate(&mut self, position: Position) {
        let _ = self.cells.remove(&position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupy_and_vacate_track_positions() {
        let mut occupancy = Occupancy::default();
        let position = Position::new(2, 4);
        occupancy.occupy(BallId::new(1), position);
        assert_eq!(occupancy.occupant(position), Some(BallId::new(1)));
        occupancy.vacate(position);
        assert_eq!(occupancy.occupant(position), None);
    }

    #[test]
    fn fill_with_discards_previous_entries() {
        let mut occupancy = Occupancy::default();
        occupancy.occupy(BallId::new(1), Position::new(0, 0));
        occupancy.fill_with([(Position::new(2, 2), BallId::new(7))]);
        assert_eq!(occupancy.occupant(Position::new(0, 0)), None);
        assert_eq!(occupancy.occupant(Position::new(2, 2)), Some(BallId::new(7)));
    }
}
