//! Terminal Pac-Man: a tile maze, a player, and four ghosts with their
//! classic personalities, driven by a fixed-step simulation.

pub mod audio;
pub mod components;
pub mod config;
pub mod events;
pub mod game;
pub mod ghost;
pub mod highscore;
pub mod input;
pub mod level;
pub mod motion;
pub mod pathing;
pub mod player;
pub mod render;

pub use components::{Direction, Position, Tile};
pub use config::{Config, GameTuning};
pub use events::GameEvent;
pub use game::{GameState, Session, Snapshot};
pub use ghost::{GhostKind, Mode};
pub use level::Maze;
