use crate::components::{Direction, Position, Tile};
use crate::level::Maze;
use crate::motion::{self, CENTER_EPSILON};

#[derive(Debug, Clone)]
pub struct Pacman {
    pub pos: Position,
    pub direction: Direction,
    /// Latest turn request; a newer request replaces an older one.
    pub next_direction: Direction,
    pub speed: f32,
    spawn: Tile,
}

impl Pacman {
    pub fn new(spawn: Tile, speed: f32) -> Self {
        Pacman {
            pos: Position::from(spawn),
            direction: Direction::Up,
            next_direction: Direction::Right,
            speed,
            spawn,
        }
    }

    pub fn reset(&mut self) {
        *self = Pacman::new(self.spawn, self.speed);
    }

    pub fn tile(&self) -> Tile {
        self.pos.tile()
    }

    pub fn is_centered(&self) -> bool {
        self.pos.is_centered(CENTER_EPSILON)
    }

    pub fn request_turn(&mut self, dir: Direction) {
        if !dir.is_none() {
            self.next_direction = dir;
        }
    }

    /// Commits the queued turn if we sit on a tile centre and the tile in
    /// that direction is open. Returns whether the turn was taken.
    pub fn apply_turn(&mut self, maze: &Maze) -> bool {
        let want = self.next_direction;
        if want.is_none() || !self.is_centered() {
            return false;
        }
        if maze.exit(self.tile(), want, |t| maze.blocks_player(t)).is_none() {
            return false;
        }
        self.direction = want;
        self.next_direction = Direction::None;
        true
    }

    pub fn advance(&mut self, maze: &Maze, dt: f32) {
        self.pos = motion::advance(self.pos, self.direction, self.speed, dt, |t| {
            maze.blocks_player(t)
        });
        self.pos = motion::tunnel_wrap(maze, self.pos, self.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn turn_at_spawn_converges_to_next_tile() {
        let maze = Maze::classic();
        let mut pac = Pacman::new(Tile::new(13, 23), 6.0);
        pac.request_turn(Direction::Right);
        assert!(pac.apply_turn(&maze));
        assert_eq!(pac.direction, Direction::Right);
        for _ in 0..20 {
            pac.advance(&maze, DT);
        }
        assert_eq!(pac.pos, Position::new(14.0, 23.0));
    }

    #[test]
    fn blocked_turn_is_kept_queued() {
        let maze = Maze::classic();
        let mut pac = Pacman::new(Tile::new(13, 23), 6.0);
        pac.direction = Direction::Right;
        pac.request_turn(Direction::Up);
        assert!(!pac.apply_turn(&maze));
        assert_eq!(pac.direction, Direction::Right);
        assert_eq!(pac.next_direction, Direction::Up);
    }

    #[test]
    fn turn_requires_centre() {
        let maze = Maze::classic();
        let mut pac = Pacman::new(Tile::new(13, 23), 6.0);
        pac.pos = Position::new(13.3, 23.0);
        pac.request_turn(Direction::Left);
        assert!(!pac.apply_turn(&maze));
    }

    #[test]
    fn none_request_keeps_previous() {
        let mut pac = Pacman::new(Tile::new(13, 23), 6.0);
        pac.request_turn(Direction::Down);
        pac.request_turn(Direction::None);
        assert_eq!(pac.next_direction, Direction::Down);
    }

    #[test]
    fn player_cannot_enter_ghost_house() {
        let maze = Maze::classic();
        let mut pac = Pacman::new(Tile::new(13, 11), 6.0);
        pac.request_turn(Direction::Down);
        assert!(!pac.apply_turn(&maze));
        pac.direction = Direction::Down;
        for _ in 0..60 {
            pac.advance(&maze, DT);
        }
        assert_eq!(pac.pos, Position::new(13.0, 11.0));
    }
}
