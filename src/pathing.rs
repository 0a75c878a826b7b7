//! Ghost steering: breadth-first first-step selection over the maze.
//!
//! Visited/parent bookkeeping lives in a [`PathScratch`] owned by the
//! caller, so buffers are reused across calls instead of being global. A
//! generation stamp marks which slots belong to the current search, which
//! makes resetting the buffers O(1).

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Direction, Tile};
use crate::ghost::Mode;
use crate::level::Maze;

const NO_PARENT: u32 = u32::MAX;

#[derive(Debug, Default)]
pub struct PathScratch {
    stamp: Vec<u32>,
    parent: Vec<u32>,
    generation: u32,
    queue: VecDeque<Tile>,
}

impl PathScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self, len: usize) {
        if self.stamp.len() != len {
            self.stamp = vec![0; len];
            self.parent = vec![NO_PARENT; len];
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamp.fill(0);
            self.generation = 1;
        }
        self.queue.clear();
    }

    fn visit(&mut self, idx: usize, parent: u32) -> bool {
        if self.stamp[idx] == self.generation {
            return false;
        }
        self.stamp[idx] = self.generation;
        self.parent[idx] = parent;
        true
    }

    fn seen(&self, idx: usize) -> bool {
        self.stamp[idx] == self.generation
    }
}

fn index_of(maze: &Maze, tile: Tile) -> usize {
    (tile.y * maze.width() + tile.x) as usize
}

fn tile_of(maze: &Maze, idx: usize) -> Tile {
    let w = maze.width() as usize;
    Tile::new((idx % w) as i32, (idx / w) as i32)
}

/// Whether a ghost standing on `tile` may use the house gate. Eaten ghosts
/// and ghosts still inside the house may; everyone else has left for good.
pub fn gate_open(maze: &Maze, tile: Tile, mode: Mode) -> bool {
    mode == Mode::Eaten || maze.in_house(tile)
}

/// Ghost-legal exits from `tile` in fixed search order, tunnel wrap included.
pub fn legal_exits(
    maze: &Maze,
    tile: Tile,
    gate_open: bool,
) -> impl Iterator<Item = (Direction, Tile)> + '_ {
    Direction::SEARCH_ORDER.into_iter().filter_map(move |dir| {
        maze.exit(tile, dir, |t| maze.blocks_ghost(t, gate_open))
            .map(|next| (dir, next))
    })
}

pub fn is_legal(maze: &Maze, tile: Tile, dir: Direction, gate_open: bool) -> bool {
    maze.exit(tile, dir, |t| maze.blocks_ghost(t, gate_open)).is_some()
}

fn usable_target(maze: &Maze, tile: Tile, gate_open: bool) -> bool {
    !maze.blocks_ghost(tile, gate_open) && (gate_open || !maze.in_house(tile))
}

/// Nearest tile to `target` a ghost could stand on, searching outward in
/// the fixed neighbour order. With the gate closed the house interior does
/// not count. Targets are clamped into the grid first.
pub fn resolve_target(
    maze: &Maze,
    scratch: &mut PathScratch,
    target: Tile,
    gate_open: bool,
) -> Tile {
    let target = target.clamp_to(maze.width(), maze.height());
    if usable_target(maze, target, gate_open) {
        return target;
    }
    let len = (maze.width() * maze.height()) as usize;
    scratch.begin(len);
    scratch.visit(index_of(maze, target), NO_PARENT);
    scratch.queue.push_back(target);
    while let Some(tile) = scratch.queue.pop_front() {
        if usable_target(maze, tile, gate_open) {
            return tile;
        }
        for dir in Direction::SEARCH_ORDER {
            let next = tile.step(dir);
            if maze.in_bounds(next) && scratch.visit(index_of(maze, next), NO_PARENT) {
                scratch.queue.push_back(next);
            }
        }
    }
    target
}

/// Direction of the first step on a shortest path from `from` to `target`.
///
/// At the root the reverse of `heading` is only expanded when it is the one
/// legal exit. Returns `None` when the target is unreachable, is the root
/// itself, or the path cannot be rebuilt.
pub fn first_step(
    maze: &Maze,
    scratch: &mut PathScratch,
    from: Tile,
    heading: Direction,
    target: Tile,
    gate_open: bool,
) -> Option<Direction> {
    if !maze.in_bounds(from) || !maze.in_bounds(target) || from == target {
        return None;
    }
    let blocked = |t: Tile| maze.blocks_ghost(t, gate_open);
    let reverse = heading.opposite();
    let forward_exits = legal_exits(maze, from, gate_open)
        .filter(|(dir, _)| *dir != reverse)
        .count();
    let allow_reverse = forward_exits == 0;

    let len = (maze.width() * maze.height()) as usize;
    scratch.begin(len);
    let root = index_of(maze, from);
    let goal = index_of(maze, target);
    scratch.visit(root, NO_PARENT);
    scratch.queue.push_back(from);

    while let Some(tile) = scratch.queue.pop_front() {
        let here = index_of(maze, tile) as u32;
        let at_root = here as usize == root;
        for dir in Direction::SEARCH_ORDER {
            if at_root && dir == reverse && !allow_reverse {
                continue;
            }
            let Some(next) = maze.exit(tile, dir, blocked) else {
                continue;
            };
            let idx = index_of(maze, next);
            if scratch.visit(idx, here) {
                if idx == goal {
                    scratch.queue.clear();
                    break;
                }
                scratch.queue.push_back(next);
            }
        }
    }

    if !scratch.seen(goal) {
        return None;
    }

    let mut step = goal;
    for _ in 0..len {
        let parent = scratch.parent[step];
        if parent == NO_PARENT {
            return None;
        }
        if parent as usize == root {
            let first = tile_of(maze, step);
            return Direction::SEARCH_ORDER
                .into_iter()
                .filter(|dir| allow_reverse || *dir != reverse)
                .find(|dir| maze.exit(from, *dir, blocked) == Some(first));
        }
        step = parent as usize;
    }
    None
}

/// Picks the next committed direction for a ghost centred on `tile`.
pub fn choose_dir<R: Rng + ?Sized>(
    maze: &Maze,
    scratch: &mut PathScratch,
    rng: &mut R,
    tile: Tile,
    heading: Direction,
    mode: Mode,
    target: Tile,
) -> Direction {
    let reverse = heading.opposite();
    let gate_open = gate_open(maze, tile, mode);

    if mode == Mode::Frightened {
        let open: Vec<Direction> = legal_exits(maze, tile, gate_open)
            .map(|(dir, _)| dir)
            .collect();
        let forward: Vec<Direction> = open.iter().copied().filter(|d| *d != reverse).collect();
        let pool = if forward.is_empty() { &open } else { &forward };
        return pool.choose(rng).copied().unwrap_or(heading);
    }

    let straight = is_legal(maze, tile, heading, gate_open);
    if tile == target && straight {
        return heading;
    }

    let target = resolve_target(maze, scratch, target, gate_open);
    if let Some(dir) = first_step(maze, scratch, tile, heading, target, gate_open) {
        return dir;
    }

    fallback_dir(maze, tile, heading, gate_open)
}

/// Straight if possible, else the first non-reverse exit, else back.
pub fn fallback_dir(maze: &Maze, tile: Tile, heading: Direction, gate_open: bool) -> Direction {
    if is_legal(maze, tile, heading, gate_open) {
        return heading;
    }
    let reverse = heading.opposite();
    legal_exits(maze, tile, gate_open)
        .map(|(dir, _)| dir)
        .find(|dir| *dir != reverse)
        .unwrap_or(if reverse.is_none() { heading } else { reverse })
}
