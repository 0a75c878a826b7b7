use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Direction, PelletKind, Position, Tile};
use crate::config::GameTuning;
use crate::events::{EventQueue, GameEvent};
use crate::ghost::{Ghost, GhostKind, Mode, PursuitView};
use crate::level::Maze;
use crate::pathing::PathScratch;
use crate::player::Pacman;

const PELLET_SCORE: u32 = 10;
const POWER_PELLET_SCORE: u32 = 50;
const GHOST_BONUS_BASE: u32 = 200;
const GHOST_BONUS_CAP: u32 = 1600;
const SCORE_DISPLAY_MAX: u32 = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    GameOver,
    LevelCleared,
}

/// Score for the next ghost eaten after `streak` others in the same
/// frightened window: 200, 400, 800, then 1600 for every further ghost.
pub fn ghost_bonus(streak: u32) -> u32 {
    GHOST_BONUS_BASE
        .saturating_mul(1 << streak.min(3))
        .min(GHOST_BONUS_CAP)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    pub pos: Position,
    pub facing: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostView {
    pub kind: GhostKind,
    pub pos: Position,
    pub facing: Direction,
    pub mode: Mode,
    pub target: Tile,
}

/// Read-only copy of everything the presentation layer draws, taken after
/// a tick completes.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: GameState,
    pub player: AgentView,
    pub ghosts: [GhostView; 4],
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    pub level: u32,
    pub pellets_left: usize,
    pub power_timer: f32,
    pub time_left: Option<f32>,
}

/// Owns all per-game state and advances it one fixed step at a time.
#[derive(Debug)]
pub struct Session {
    tuning: GameTuning,
    maze: Maze,
    player: Pacman,
    ghosts: [Ghost; 4],
    state: GameState,
    score: u32,
    high_score: u32,
    high_score_announced: bool,
    lives: u32,
    level: u32,
    power_timer: f32,
    eat_streak: u32,
    death_cooldown: f32,
    time_left: Option<f32>,
    ticks: u64,
    rng: StdRng,
    scratch: PathScratch,
    events: EventQueue,
}

impl Session {
    pub fn new(tuning: GameTuning, high_score: u32) -> Self {
        Self::with_maze(tuning, Maze::classic(), high_score)
    }

    pub fn with_maze(tuning: GameTuning, maze: Maze, high_score: u32) -> Self {
        let tuning = tuning.sanitized();
        let rng = match tuning.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let level = maze.level();
        let player = Pacman::new(level.player_start, tuning.player_speed);
        let starts = level.ghost_starts;
        let ghosts = GhostKind::ALL.map(|kind| Ghost::new(kind, starts[kind.index()]));
        Session {
            lives: tuning.lives,
            time_left: tuning.time_limit,
            tuning,
            maze,
            player,
            ghosts,
            state: GameState::Menu,
            score: 0,
            high_score,
            high_score_announced: false,
            level: 1,
            power_timer: 0.0,
            eat_streak: 0,
            death_cooldown: 0.0,
            ticks: 0,
            rng,
            scratch: PathScratch::new(),
            events: EventQueue::default(),
        }
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Pacman {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost; 4] {
        &self.ghosts
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn display_score(&self) -> u32 {
        self.score.min(SCORE_DISPLAY_MAX)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn power_timer(&self) -> f32 {
        self.power_timer
    }

    pub fn eat_streak(&self) -> u32 {
        self.eat_streak
    }

    pub fn time_left(&self) -> Option<f32> {
        self.time_left
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // Direct access for scripted scenarios and tooling.

    pub fn player_mut(&mut self) -> &mut Pacman {
        &mut self.player
    }

    pub fn ghosts_mut(&mut self) -> &mut [Ghost; 4] {
        &mut self.ghosts
    }

    pub fn maze_mut(&mut self) -> &mut Maze {
        &mut self.maze
    }

    pub fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            player: AgentView {
                pos: self.player.pos,
                facing: self.player.direction,
            },
            ghosts: self.ghosts.each_ref().map(|g| GhostView {
                kind: g.kind,
                pos: g.pos,
                facing: g.dir,
                mode: g.mode,
                target: g.target,
            }),
            score: self.display_score(),
            high_score: self.high_score.min(SCORE_DISPLAY_MAX),
            lives: self.lives,
            level: self.level,
            pellets_left: self.maze.pellets_left(),
            power_timer: self.power_timer,
            time_left: self.time_left,
        }
    }

    pub fn start(&mut self) {
        if self.state == GameState::Menu {
            tracing::debug!("session started");
            self.state = GameState::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
            other => other,
        };
    }

    pub fn request_turn(&mut self, dir: Direction) {
        self.player.request_turn(dir);
    }

    /// Full reinitialisation; only the high score survives.
    pub fn restart(&mut self) {
        tracing::debug!(score = self.score, "session restarted");
        self.maze.reset();
        self.reset_agents();
        self.score = 0;
        self.lives = self.tuning.lives;
        self.level = 1;
        self.time_left = self.tuning.time_limit;
        self.high_score_announced = false;
        self.events.clear();
        self.state = GameState::Playing;
    }

    /// Refills the maze after a clear, keeping score and lives.
    pub fn next_level(&mut self) {
        if self.state != GameState::LevelCleared {
            return;
        }
        self.level += 1;
        self.maze.reset();
        self.reset_agents();
        self.time_left = self.tuning.time_limit;
        self.state = GameState::Playing;
        tracing::debug!(level = self.level, "next level");
    }

    fn reset_agents(&mut self) {
        self.player.reset();
        for ghost in &mut self.ghosts {
            ghost.reset();
        }
        self.power_timer = 0.0;
        self.eat_streak = 0;
        self.death_cooldown = 0.0;
    }

    /// One fixed simulation step. Does nothing unless playing.
    pub fn tick(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let dt = self.tuning.dt();
        self.ticks += 1;
        self.tick_timers(dt);

        self.player.apply_turn(&self.maze);

        if self.player.is_centered() {
            if let Some(kind) = self.maze.consume(self.player.tile()) {
                self.on_pellet(kind);
            }
            if self.maze.pellets_left() == 0 {
                self.clear_level();
                return;
            }
        }

        self.player.advance(&self.maze, dt);
        self.update_ghosts(dt);
        self.check_collisions();

        if self.state == GameState::Playing {
            self.tick_countdown(dt);
        }
    }

    fn tick_timers(&mut self, dt: f32) {
        if self.power_timer > 0.0 {
            self.power_timer = (self.power_timer - dt).max(0.0);
            if self.power_timer == 0.0 {
                self.eat_streak = 0;
            }
        }
        self.death_cooldown = (self.death_cooldown - dt).max(0.0);
    }

    fn tick_countdown(&mut self, dt: f32) {
        let Some(left) = self.time_left.as_mut() else {
            return;
        };
        *left = (*left - dt).max(0.0);
        if *left == 0.0 {
            tracing::debug!("session timer ran out");
            self.game_over();
        }
    }

    fn on_pellet(&mut self, kind: PelletKind) {
        match kind {
            PelletKind::Normal => {
                self.add_score(PELLET_SCORE);
                self.events.push(GameEvent::PelletEaten);
            }
            PelletKind::Power => {
                self.add_score(POWER_PELLET_SCORE);
                self.power_timer = self.tuning.power_duration;
                self.eat_streak = 0;
                self.events.push(GameEvent::PowerPelletEaten);
                tracing::debug!(duration = self.power_timer, "power pellet eaten");
            }
        }
    }

    fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
            if !self.high_score_announced {
                self.high_score_announced = true;
                self.events.push(GameEvent::NewHighScore { score: self.score });
            }
        }
    }

    /// Ghosts run in identity order so later heuristics see Blinky's
    /// position from this tick.
    fn update_ghosts(&mut self, dt: f32) {
        let power_active = self.power_timer > 0.0;
        let home = self.maze.level().home;
        let player_tile = self.player.tile();
        let player_dir = self.player.direction;

        for idx in 0..self.ghosts.len() {
            let blinky_tile = self.ghosts[GhostKind::Blinky.index()].tile();
            let ghost = &mut self.ghosts[idx];
            ghost.update_mode(power_active, dt, &self.tuning.schedule, home);
            let view = PursuitView {
                player_tile,
                player_dir,
                blinky_tile,
                own_tile: ghost.tile(),
            };
            ghost.steer(
                &view,
                &self.maze,
                &mut self.scratch,
                home,
                self.tuning.wander_radius,
                &mut self.rng,
            );
            ghost.advance(&self.maze, self.tuning.ghost_speed, dt);
        }
    }

    fn check_collisions(&mut self) {
        let power_active = self.power_timer > 0.0;
        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx];
            if ghost.pos.distance_sq(self.player.pos) >= self.tuning.collision_radius_sq {
                continue;
            }
            let mode = ghost.mode;
            match mode {
                Mode::Eaten => {}
                _ if power_active => self.eat_ghost(idx),
                Mode::Frightened => {}
                Mode::Scatter | Mode::Chase => {
                    if self.death_cooldown <= 0.0 {
                        self.lose_life();
                        return;
                    }
                }
            }
        }
    }

    fn eat_ghost(&mut self, idx: usize) {
        let bonus = ghost_bonus(self.eat_streak);
        self.eat_streak += 1;
        let ghost = &mut self.ghosts[idx];
        ghost.mark_eaten();
        let kind = ghost.kind;
        self.add_score(bonus);
        self.events.push(GameEvent::GhostEaten { ghost: kind, bonus });
        tracing::debug!(ghost = kind.name(), bonus, streak = self.eat_streak, "ghost eaten");
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::PlayerDied {
            lives_left: self.lives,
        });
        tracing::debug!(lives = self.lives, score = self.score, "player died");
        if self.lives == 0 {
            self.game_over();
            return;
        }
        self.reset_agents();
        self.death_cooldown = self.tuning.death_cooldown;
    }

    fn game_over(&mut self) {
        self.state = GameState::GameOver;
        self.events.push(GameEvent::GameOver { score: self.score });
        tracing::info!(score = self.score, level = self.level, "game over");
    }

    fn clear_level(&mut self) {
        self.state = GameState::LevelCleared;
        self.events.push(GameEvent::LevelCleared { level: self.level });
        tracing::info!(level = self.level, score = self.score, "level cleared");
    }
}
