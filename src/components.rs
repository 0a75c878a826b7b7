use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Fixed tie-break order used by every neighbour scan.
    pub const SEARCH_ORDER: [Direction; 4] =
        [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }
}

/// Integer maze coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction, tiles: i32) -> Tile {
        let (dx, dy) = dir.delta();
        Tile {
            x: self.x + dx * tiles,
            y: self.y + dy * tiles,
        }
    }

    pub fn step(self, dir: Direction) -> Tile {
        self.offset(dir, 1)
    }

    pub fn manhattan(self, other: Tile) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn clamp_to(self, width: i32, height: i32) -> Tile {
        Tile {
            x: self.x.clamp(0, width - 1),
            y: self.y.clamp(0, height - 1),
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous position in tile units. A value of `(3.0, 5.0)` is the exact
/// centre of tile `(3, 5)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn tile(self) -> Tile {
        Tile {
            x: self.x.round() as i32,
            y: self.y.round() as i32,
        }
    }

    pub fn is_centered(self, epsilon: f32) -> bool {
        near_integer(self.x, epsilon) && near_integer(self.y, epsilon)
    }

    pub fn distance_sq(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<Tile> for Position {
    fn from(tile: Tile) -> Self {
        Position {
            x: tile.x as f32,
            y: tile.y as f32,
        }
    }
}

pub fn near_integer(value: f32, epsilon: f32) -> bool {
    (value - value.round()).abs() < epsilon
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Open,
    Pellet,
    PowerPellet,
    Tunnel,
    Gate,
    Spawn,
}

impl CellKind {
    pub fn is_wall(self) -> bool {
        self == CellKind::Wall
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PelletKind {
    Normal,
    Power,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn opposite_of_none_is_none() {
        assert_eq!(Direction::None.opposite(), Direction::None);
    }

    #[test]
    fn centered_uses_tolerance() {
        assert!(Position::new(4.004, 7.0).is_centered(1e-2));
        assert!(!Position::new(4.004, 7.0).is_centered(1e-3));
        assert!(!Position::new(4.5, 7.0).is_centered(1e-2));
    }

    #[test]
    fn position_rounds_to_nearest_tile() {
        assert_eq!(Position::new(2.49, 3.51).tile(), Tile::new(2, 4));
    }

    proptest! {
        #[test]
        fn opposite_is_an_involution(idx in 0usize..4) {
            let dir = Direction::SEARCH_ORDER[idx];
            prop_assert_ne!(dir.opposite(), dir);
            prop_assert_eq!(dir.opposite().opposite(), dir);
        }

        #[test]
        fn clamp_stays_in_bounds(x in -100i32..100, y in -100i32..100) {
            let t = Tile::new(x, y).clamp_to(28, 31);
            prop_assert!((0..28).contains(&t.x));
            prop_assert!((0..31).contains(&t.y));
        }
    }
}
