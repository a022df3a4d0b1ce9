use crate::position::Position;

/// Ordered route from start to goal, both inclusive.
///
/// Teleport-only waypoints are elided by the planner, so consecutive cells are
/// not guaranteed to be adjacent for teleporting movers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    cells: Vec<Position>,
}

impl Path {
    pub fn new(cells: Vec<Position>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    pub fn first(&self) -> Option<Position> {
        self.cells.first().copied()
    }

    pub fn last(&self) -> Option<Position> {
        self.cells.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<Position> {
        self.cells.get(index).copied()
    }

    /// Cell reached by advancing at most `stride` cells, and the stride used.
    ///
    /// Never moves past the final cell; a path of one cell yields index 0.
    pub fn stride_target(&self, stride: usize) -> Option<(usize, Position)> {
        let index = stride.min(self.cells.len().checked_sub(1)?);
        Some((index, self.cells[index]))
    }

    /// Shifts every cell by `offset`, e.g. from grid-local into world space.
    pub fn translated(&self, offset: Position) -> Path {
        Path::new(
            self.cells
                .iter()
                .map(|p| p.offset(offset.x, offset.y))
                .collect(),
        )
    }

    /// Drops the first `count` cells, keeping at least the final one.
    pub fn advance(&mut self, count: usize) {
        let count = count.min(self.cells.len().saturating_sub(1));
        self.cells.drain(..count);
    }

    /// Drops the prefix that precedes the cell closest to `position`.
    ///
    /// Used to pick up a cached route again after a detour.
    pub fn resume_from(&mut self, position: Position) {
        let closest = self
            .cells
            .iter()
            .enumerate()
            .min_by_key(|(idx, cell)| (cell.distance_squared(position), usize::MAX - idx))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        self.advance(closest);
    }

    pub fn into_cells(self) -> Vec<Position> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(len: i32) -> Path {
        Path::new((0..len).map(|x| Position::new(x, 0)).collect())
    }

    #[test]
    fn stride_is_clamped_to_the_goal() {
        let path = line(5);
        assert_eq!(path.stride_target(8), Some((4, Position::new(4, 0))));
        assert_eq!(path.stride_target(2), Some((2, Position::new(2, 0))));
        assert_eq!(Path::default().stride_target(3), None);
    }

    #[test]
    fn advance_keeps_the_goal() {
        let mut path = line(3);
        path.advance(10);
        assert_eq!(path.cells(), &[Position::new(2, 0)]);
    }

    #[test]
    fn resume_prefers_the_furthest_of_equally_close_cells() {
        let mut path = line(10);
        path.resume_from(Position::new(6, 3));
        assert_eq!(path.first(), Some(Position::new(6, 0)));

        let mut path = Path::new(vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(1, 0),
            Position::new(2, 0),
        ]);
        path.resume_from(Position::new(1, 0));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn translation_moves_every_cell() {
        let path = line(2).translated(Position::new(10, -5));
        assert_eq!(path.cells(), &[Position::new(10, -5), Position::new(11, -5)]);
    }
}
