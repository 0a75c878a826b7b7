//! Sub-tile movement shared by the player and the ghosts.
//!
//! Positions live in continuous tile space and are snapped to exact tile
//! centres whenever an agent arrives, so float error never accumulates
//! across tiles.

use crate::components::{near_integer, CellKind, Direction, Position, Tile};
use crate::level::Maze;

/// Capture window for turn and pellet decisions.
pub const CENTER_EPSILON: f32 = 1e-2;
/// Tighter window for tunnel teleports.
pub const WRAP_EPSILON: f32 = 1e-3;
const ARRIVE_EPSILON: f32 = 1e-4;

pub fn is_centered(coord: f32) -> bool {
    near_integer(coord, CENTER_EPSILON)
}

/// Moves `pos` toward the next tile centre along `dir` by at most
/// `speed * dt` tiles.
///
/// If the tile ahead is blocked the agent is snapped onto the centre of the
/// tile it currently rounds to and does not move.
pub fn advance<F>(pos: Position, dir: Direction, speed: f32, dt: f32, blocked: F) -> Position
where
    F: Fn(Tile) -> bool,
{
    if dir.is_none() {
        return pos;
    }
    let current = pos.tile();
    let (dx, dy) = dir.delta();
    let ahead = (current.x as f32 - pos.x) * dx as f32 + (current.y as f32 - pos.y) * dy as f32;

    let target = if ahead > ARRIVE_EPSILON {
        // Still approaching the centre of the tile we round to.
        current
    } else {
        let next = current.step(dir);
        if blocked(next) {
            return Position::from(current);
        }
        next
    };

    let goal = Position::from(target);
    let vx = goal.x - pos.x;
    let vy = goal.y - pos.y;
    let dist = (vx * vx + vy * vy).sqrt();
    if dist <= 1e-6 {
        return goal;
    }
    let adv = (speed * dt).max(0.0).min(dist);
    if adv >= dist - ARRIVE_EPSILON {
        return goal;
    }
    Position::new(pos.x + vx / dist * adv, pos.y + vy / dist * adv)
}

/// Relocates an agent standing on an edge tunnel cell to the opposite edge
/// when it is heading out of the maze. Any other position is returned as is.
pub fn tunnel_wrap(maze: &Maze, pos: Position, dir: Direction) -> Position {
    if !pos.is_centered(WRAP_EPSILON) {
        return pos;
    }
    let tile = pos.tile();
    if maze.layout_at(tile) != CellKind::Tunnel {
        return pos;
    }
    match maze.wrap_target(tile, dir) {
        Some(dest) => Position::from(dest),
        None => pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 120.0;

    #[test]
    fn moves_toward_open_neighbour() {
        let maze = Maze::classic();
        let start = Position::new(1.0, 1.0);
        let next = advance(start, Direction::Right, 6.0, DT, |t| maze.is_wall(t));
        assert!((next.x - (1.0 + 6.0 * DT)).abs() < 1e-5);
        assert_eq!(next.y, 1.0);
    }

    #[test]
    fn snaps_when_blocked() {
        let maze = Maze::classic();
        let drifted = Position::new(1.004, 0.996);
        let next = advance(drifted, Direction::Up, 6.0, DT, |t| maze.is_wall(t));
        assert_eq!(next, Position::new(1.0, 1.0));
    }

    #[test]
    fn never_overshoots_the_next_centre() {
        let maze = Maze::classic();
        let start = Position::new(1.0, 1.0);
        let next = advance(start, Direction::Right, 500.0, DT, |t| maze.is_wall(t));
        assert_eq!(next, Position::new(2.0, 1.0));
    }

    #[test]
    fn lands_exactly_on_each_centre() {
        let maze = Maze::classic();
        let mut pos = Position::new(1.0, 1.0);
        let mut centres = Vec::new();
        for _ in 0..100 {
            pos = advance(pos, Direction::Right, 6.0, DT, |t| maze.is_wall(t));
            if pos.x.fract() == 0.0 {
                centres.push(pos.x as i32);
            }
        }
        centres.dedup();
        assert_eq!(centres, (2..=6).collect::<Vec<_>>());
    }

    #[test]
    fn past_midpoint_targets_the_rounded_tile() {
        let maze = Maze::classic();
        let pos = Position::new(1.7, 1.0);
        let next = advance(pos, Direction::Right, 6.0, 1.0, |t| maze.is_wall(t));
        assert_eq!(next, Position::new(2.0, 1.0));
    }

    #[test]
    fn none_direction_stays_put() {
        let pos = Position::new(3.3, 5.0);
        assert_eq!(advance(pos, Direction::None, 6.0, DT, |_| false), pos);
    }

    #[test]
    fn wraps_through_tunnels() {
        let maze = Maze::classic();
        let left = Position::new(0.0, 14.0);
        assert_eq!(tunnel_wrap(&maze, left, Direction::Left), Position::new(27.0, 14.0));
        assert_eq!(tunnel_wrap(&maze, left, Direction::Right), left);
        let right = Position::new(27.0, 14.0);
        assert_eq!(tunnel_wrap(&maze, right, Direction::Right), Position::new(0.0, 14.0));
        let off_centre = Position::new(0.005, 14.0);
        assert_eq!(tunnel_wrap(&maze, off_centre, Direction::Left), off_centre);
    }

    #[test]
    fn walking_left_out_of_the_tunnel_reappears_right() {
        let maze = Maze::classic();
        let mut pos = Position::new(2.0, 14.0);
        let mut wrapped = false;
        for _ in 0..120 {
            pos = advance(pos, Direction::Left, 6.0, DT, |t| maze.is_wall(t));
            pos = tunnel_wrap(&maze, pos, Direction::Left);
            if pos.x > 20.0 {
                wrapped = true;
                break;
            }
        }
        assert!(wrapped);
        assert_eq!(pos, Position::new(27.0, 14.0));
    }

    fn dir_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
            Just(Direction::None),
        ]
    }

    proptest! {
        #[test]
        fn never_enters_a_wall(
            start_idx in 0usize..244,
            steps in prop::collection::vec((dir_strategy(), 1u32..40), 1..60),
        ) {
            let maze = Maze::classic();
            let (start, _) = maze.pellets().nth(start_idx).unwrap();
            let mut pos = Position::from(start);
            for (dir, frames) in steps {
                for _ in 0..frames {
                    pos = advance(pos, dir, 6.0, DT, |t| maze.is_wall(t));
                    prop_assert!(!maze.is_wall(pos.tile()), "entered wall at {:?}", pos);
                }
            }
        }
    }
}
