use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Direction, Position, Tile};
use crate::level::Maze;
use crate::motion::{self, CENTER_EPSILON};
use crate::pathing::{self, PathScratch};

/// Inset of the scatter corners from the maze border.
const CORNER_MARGIN: i32 = 1;
const PINKY_LOOKAHEAD: i32 = 4;
const INKY_LOOKAHEAD: i32 = 2;
const CLYDE_SHY_DISTANCE: i32 = 8;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

#[derive(Debug, Clone, Copy)]
enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy)]
enum Pursuit {
    Direct,
    Ambush,
    Pincer,
    Shy,
}

#[derive(Debug, Clone, Copy)]
struct Profile {
    name: &'static str,
    corner: Corner,
    pursuit: Pursuit,
}

const PROFILES: [Profile; 4] = [
    Profile {
        name: "blinky",
        corner: Corner::TopRight,
        pursuit: Pursuit::Direct,
    },
    Profile {
        name: "pinky",
        corner: Corner::TopLeft,
        pursuit: Pursuit::Ambush,
    },
    Profile {
        name: "inky",
        corner: Corner::BottomRight,
        pursuit: Pursuit::Pincer,
    },
    Profile {
        name: "clyde",
        corner: Corner::BottomLeft,
        pursuit: Pursuit::Shy,
    },
];

impl GhostKind {
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Blinky,
        GhostKind::Pinky,
        GhostKind::Inky,
        GhostKind::Clyde,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    fn profile(self) -> &'static Profile {
        &PROFILES[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    pub fn scatter_corner(self, width: i32, height: i32) -> Tile {
        let (left, right) = (CORNER_MARGIN, width - 1 - CORNER_MARGIN);
        let (top, bottom) = (CORNER_MARGIN, height - 1 - CORNER_MARGIN);
        match self.profile().corner {
            Corner::TopLeft => Tile::new(left, top),
            Corner::TopRight => Tile::new(right, top),
            Corner::BottomLeft => Tile::new(left, bottom),
            Corner::BottomRight => Tile::new(right, bottom),
        }
    }

    /// Chase target before clamping.
    pub fn chase_target(self, view: &PursuitView, width: i32, height: i32) -> Tile {
        let player = view.player_tile;
        match self.profile().pursuit {
            Pursuit::Direct => player,
            Pursuit::Ambush => player.offset(view.player_dir, PINKY_LOOKAHEAD),
            Pursuit::Pincer => {
                let pivot = player.offset(view.player_dir, INKY_LOOKAHEAD);
                Tile::new(
                    2 * pivot.x - view.blinky_tile.x,
                    2 * pivot.y - view.blinky_tile.y,
                )
            }
            Pursuit::Shy => {
                if view.own_tile.manhattan(player) >= CLYDE_SHY_DISTANCE {
                    player
                } else {
                    self.scatter_corner(width, height)
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Mode {
    Scatter,
    Chase,
    Frightened,
    Eaten,
}

impl Mode {
    pub fn speed_factor(self) -> f32 {
        match self {
            Mode::Frightened => 0.5,
            Mode::Eaten => 1.5,
            Mode::Scatter | Mode::Chase => 1.0,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Mode::Scatter => "scatter",
            Mode::Chase => "chase",
            Mode::Frightened => "frightened",
            Mode::Eaten => "eaten",
        }
    }
}

/// Alternating scatter/chase windows. Each breakpoint (seconds of mode
/// clock) flips the phase, starting in scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeSchedule {
    breakpoints: Vec<f32>,
}

impl ModeSchedule {
    pub fn new(mut breakpoints: Vec<f32>) -> Self {
        breakpoints.retain(|b| b.is_finite() && *b >= 0.0);
        breakpoints.sort_by(f32::total_cmp);
        Self { breakpoints }
    }

    pub fn phase_at(&self, clock: f32) -> Mode {
        let flips = self.breakpoints.iter().filter(|b| clock >= **b).count();
        if flips % 2 == 0 {
            Mode::Scatter
        } else {
            Mode::Chase
        }
    }
}

impl Default for ModeSchedule {
    fn default() -> Self {
        Self::new(vec![7.0, 27.0, 34.0])
    }
}

/// What the chase heuristics may look at.
#[derive(Debug, Clone, Copy)]
pub struct PursuitView {
    pub player_tile: Tile,
    pub player_dir: Direction,
    pub blinky_tile: Tile,
    pub own_tile: Tile,
}

#[derive(Debug, Clone)]
pub struct Ghost {
    pub kind: GhostKind,
    pub pos: Position,
    pub dir: Direction,
    pub mode: Mode,
    pub mode_clock: f32,
    pub target: Tile,
    spawn: Tile,
}

impl Ghost {
    pub fn new(kind: GhostKind, spawn: Tile) -> Self {
        Ghost {
            kind,
            pos: Position::from(spawn),
            dir: Direction::Up,
            mode: Mode::Scatter,
            mode_clock: 0.0,
            target: spawn,
            spawn,
        }
    }

    pub fn reset(&mut self) {
        *self = Ghost::new(self.kind, self.spawn);
    }

    pub fn tile(&self) -> Tile {
        self.pos.tile()
    }

    pub fn is_centered(&self) -> bool {
        self.pos.is_centered(CENTER_EPSILON)
    }

    /// Runs one tick of the mode machine. Rules are checked in priority
    /// order: power pellet, frightened expiry, schedule. Eaten ghosts only
    /// leave that mode by reaching `home`.
    pub fn update_mode(
        &mut self,
        power_active: bool,
        dt: f32,
        schedule: &ModeSchedule,
        home: Tile,
    ) {
        let before = self.mode;
        match self.mode {
            Mode::Eaten => {
                if self.is_centered() && self.tile() == home {
                    self.mode = Mode::Scatter;
                    self.mode_clock = 0.0;
                }
            }
            _ if power_active => self.mode = Mode::Frightened,
            Mode::Frightened => self.mode = schedule.phase_at(self.mode_clock),
            Mode::Scatter | Mode::Chase => {
                self.mode_clock += dt;
                self.mode = schedule.phase_at(self.mode_clock);
            }
        }
        if before != self.mode {
            tracing::trace!(
                ghost = self.kind.name(),
                from = before.tag(),
                to = self.mode.tag(),
                clock = self.mode_clock,
                "ghost mode change"
            );
        }
    }

    pub fn mark_eaten(&mut self) {
        self.mode = Mode::Eaten;
    }

    /// Tile this ghost steers toward in its current mode.
    pub fn target_tile<R: Rng + ?Sized>(
        &self,
        view: &PursuitView,
        maze: &Maze,
        home: Tile,
        wander_radius: i32,
        rng: &mut R,
    ) -> Tile {
        let (w, h) = (maze.width(), maze.height());
        let raw = match self.mode {
            Mode::Scatter => self.kind.scatter_corner(w, h),
            Mode::Chase => self.kind.chase_target(view, w, h),
            Mode::Eaten => home,
            Mode::Frightened => {
                let r = wander_radius.max(0);
                Tile::new(
                    view.player_tile.x + rng.gen_range(-r..=r),
                    view.player_tile.y + rng.gen_range(-r..=r),
                )
            }
        };
        raw.clamp_to(w, h)
    }

    /// Re-targets and picks a new heading. Only acts on tile centres.
    pub fn steer<R: Rng + ?Sized>(
        &mut self,
        view: &PursuitView,
        maze: &Maze,
        scratch: &mut PathScratch,
        home: Tile,
        wander_radius: i32,
        rng: &mut R,
    ) {
        if !self.is_centered() {
            return;
        }
        self.target = self.target_tile(view, maze, home, wander_radius, rng);
        self.dir = pathing::choose_dir(
            maze,
            scratch,
            rng,
            self.tile(),
            self.dir,
            self.mode,
            self.target,
        );
    }

    pub fn advance(&mut self, maze: &Maze, base_speed: f32, dt: f32) {
        let speed = base_speed * self.mode.speed_factor();
        let gate_open = pathing::gate_open(maze, self.tile(), self.mode);
        self.pos = motion::advance(self.pos, self.dir, speed, dt, |t| {
            maze.blocks_ghost(t, gate_open)
        });
        self.pos = motion::tunnel_wrap(maze, self.pos, self.dir);
    }
}
