/// Integer tile coordinate, either world-space or grid-local depending on context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_squared(self, other: Position) -> u64 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        dx * dx + dy * dy
    }

    /// Euclidean distance truncated to whole tiles.
    pub fn distance(self, other: Position) -> u32 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt() as u32
    }

    /// Number of king moves between two tiles.
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Returns true when `other` is one of the eight surrounding tiles.
    pub fn is_adjacent(self, other: Position) -> bool {
        self != other && self.chebyshev_distance(other) == 1
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_truncates_towards_zero() {
        let a = Position::new(0, 0);
        assert_eq!(a.distance(Position::new(3, 4)), 5);
        assert_eq!(a.distance(Position::new(1, 1)), 1);
        assert_eq!(a.distance(Position::new(-6, 0)), 6);
    }

    #[test]
    fn chebyshev_counts_diagonals_as_one() {
        let a = Position::new(2, 2);
        assert_eq!(a.chebyshev_distance(Position::new(5, 3)), 3);
        assert_eq!(a.chebyshev_distance(Position::new(0, 0)), 2);
        assert!(a.is_adjacent(Position::new(3, 3)));
        assert!(!a.is_adjacent(a));
    }
}
