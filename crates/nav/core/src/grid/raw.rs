use crate::collision::CollisionType;
use crate::position::Position;

/// Reasons a raw classification cannot become a grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("collision map has no rows or no columns")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{found} cells do not fill a {width}x{height} map")]
    SizeMismatch {
        width: usize,
        height: usize,
        found: usize,
    },
}

/// Rectangular, row-major tile classification as read from the game.
///
/// This is the ingestion half of grid construction. Building a [`super::Grid`]
/// never mutates a raw map; the derivation passes produce new maps instead.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawCollisionMap {
    width: usize,
    height: usize,
    cells: Vec<CollisionType>,
}

impl RawCollisionMap {
    /// Copies nested rows into a flat backing store.
    pub fn new(rows: Vec<Vec<CollisionType>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: cols.len(),
                });
            }
            cells.extend(cols);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn from_cells(
        width: usize,
        height: usize,
        cells: Vec<CollisionType>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        if cells.len() != width * height {
            return Err(GridError::SizeMismatch {
                width,
                height,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// A map where every tile has the same class.
    pub fn filled(width: usize, height: usize, kind: CollisionType) -> Result<Self, GridError> {
        Self::from_cells(width, height, vec![kind; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[CollisionType] {
        &self.cells
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as usize) < self.width
            && (position.y as usize) < self.height
    }

    pub fn get(&self, position: Position) -> Option<CollisionType> {
        self.index(position).map(|idx| self.cells[idx])
    }

    /// Overwrites one tile; out-of-bounds writes are ignored.
    pub fn set(&mut self, position: Position, kind: CollisionType) {
        if let Some(idx) = self.index(position) {
            self.cells[idx] = kind;
        }
    }

    /// Overwrites every tile in the inclusive rectangle spanned by two corners.
    pub fn fill_rect(&mut self, from: Position, to: Position, kind: CollisionType) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.set(Position::new(x, y), kind);
            }
        }
    }

    pub(crate) fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width + position.x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CollisionType::{NonWalkable as X, Walkable as O};

    #[test]
    fn rejects_empty_and_ragged_input() {
        assert_eq!(RawCollisionMap::new(vec![]), Err(GridError::Empty));
        assert_eq!(RawCollisionMap::new(vec![vec![]]), Err(GridError::Empty));
        assert_eq!(
            RawCollisionMap::new(vec![vec![O, O], vec![O]]),
            Err(GridError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn rows_are_stored_row_major() {
        let raw = RawCollisionMap::new(vec![vec![O, X, O], vec![X, O, O]]).unwrap();
        assert_eq!(raw.width(), 3);
        assert_eq!(raw.height(), 2);
        assert_eq!(raw.get(Position::new(1, 0)), Some(X));
        assert_eq!(raw.get(Position::new(0, 1)), Some(X));
        assert_eq!(raw.get(Position::new(3, 0)), None);
        assert_eq!(raw.get(Position::new(0, -1)), None);
    }
}
