use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::components::{CellKind, Direction, Tile};
use crate::game::{GameState, GhostView, Snapshot};
use crate::ghost::{GhostKind, Mode};
use crate::level::Maze;

const CELL_W: usize = 2;
/// Frightened ghosts start flashing when this little power time remains.
const FLASH_THRESHOLD: f32 = 2.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Player(Direction),
    Ghost,
    Frightened,
    Eyes,
    Wall,
    Empty,
    Pellet,
    Power,
    Gate,
}

impl Glyph {
    fn text(self) -> &'static str {
        match self {
            Glyph::Player(Direction::Left) => "ᗧ",
            Glyph::Player(Direction::Up) => "ᗢ",
            Glyph::Player(Direction::Down) => "ᗣ",
            Glyph::Player(_) => "ᗤ",
            Glyph::Ghost | Glyph::Frightened => "ᙁ",
            Glyph::Eyes => "°°",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Pellet => "· ",
            Glyph::Power => "● ",
            Glyph::Gate => "==",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

impl Cell {
    const fn new(glyph: Glyph, color: Color) -> Self {
        Cell { glyph, color }
    }
}

const BLANK: Cell = Cell::new(Glyph::Empty, Color::Reset);

fn ghost_color(kind: GhostKind) -> Color {
    match kind {
        GhostKind::Blinky => Color::Red,
        GhostKind::Pinky => Color::Magenta,
        GhostKind::Inky => Color::Cyan,
        GhostKind::Clyde => Color::DarkYellow,
    }
}

fn ghost_cell(ghost: &GhostView, power_timer: f32) -> Cell {
    match ghost.mode {
        Mode::Eaten => Cell::new(Glyph::Eyes, Color::White),
        Mode::Frightened => {
            let flashing = power_timer < FLASH_THRESHOLD && (power_timer * 4.0) as i32 % 2 == 0;
            let color = if flashing { Color::White } else { Color::Blue };
            Cell::new(Glyph::Frightened, color)
        }
        Mode::Scatter | Mode::Chase => Cell::new(Glyph::Ghost, ghost_color(ghost.kind)),
    }
}

/// What belongs at `tile`: the player over ghosts over the maze itself.
pub fn cell_for(maze: &Maze, snap: &Snapshot, tile: Tile) -> Cell {
    if snap.player.pos.tile() == tile {
        return Cell::new(Glyph::Player(snap.player.facing), Color::Yellow);
    }
    if let Some(ghost) = snap.ghosts.iter().find(|g| g.pos.tile() == tile) {
        return ghost_cell(ghost, snap.power_timer);
    }
    match maze.cell_at(tile) {
        CellKind::Wall => Cell::new(Glyph::Wall, Color::Blue),
        CellKind::Gate => Cell::new(Glyph::Gate, Color::Magenta),
        CellKind::Pellet => Cell::new(Glyph::Pellet, Color::White),
        CellKind::PowerPellet => Cell::new(Glyph::Power, Color::White),
        CellKind::Open | CellKind::Tunnel | CellKind::Spawn => BLANK,
    }
}

pub fn hud_line(snap: &Snapshot) -> String {
    let mut hud = format!(
        "Score: {}  High: {}  Lives: {}  Level: {}  Pellets: {}",
        snap.score, snap.high_score, snap.lives, snap.level, snap.pellets_left
    );
    if snap.power_timer > 0.0 {
        hud.push_str(&format!("  Power: {:.1}", snap.power_timer));
    }
    if let Some(left) = snap.time_left {
        hud.push_str(&format!("  Time: {:.0}", left.ceil()));
    }
    hud
}

pub fn banner_line(snap: &Snapshot) -> String {
    match snap.state {
        GameState::Menu => "PAC-MAN - press Enter to start, q to quit".to_string(),
        GameState::Playing => String::new(),
        GameState::Paused => "PAUSED - press Space to resume".to_string(),
        GameState::GameOver => format!(
            "GAME OVER - Final Score: {} (r to restart, q to quit)",
            snap.score
        ),
        GameState::LevelCleared => format!(
            "LEVEL {} CLEARED - press n for the next level",
            snap.level
        ),
    }
}

/// Draws the maze into a terminal, rewriting only cells that changed since
/// the previous frame.
#[derive(Debug)]
pub struct Renderer {
    width: usize,
    height: usize,
    cell_w: usize,
    last: Vec<Cell>,
    last_hud: String,
    last_banner: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize, cell_w: usize) -> Self {
        Self {
            width,
            height,
            cell_w: cell_w.max(CELL_W),
            last: vec![BLANK; width * height],
            last_hud: String::new(),
            last_banner: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    /// Terminal size needed for HUD, maze and banner, as (cols, rows).
    pub fn required_size(&self) -> (u16, u16) {
        ((self.width * self.cell_w) as u16, (self.height + 2) as u16)
    }

    pub fn draw<W: Write>(
        &mut self,
        out: &mut W,
        maze: &Maze,
        snap: &Snapshot,
        term: (u16, u16),
    ) -> io::Result<()> {
        let (needed_w, needed_h) = self.required_size();
        let (term_w, term_h) = term;

        out.queue(MoveTo(0, 0))?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(snap);
        if self.needs_full || hud != self.last_hud {
            self.draw_line(out, self.origin_y - 1, &hud, Color::White)?;
            self.last_hud = hud;
        }

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = cell_for(maze, snap, Tile::new(x as i32, y as i32));
                let idx = y * self.width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, x, y, cell)?;
                }
            }
        }

        let banner = banner_line(snap);
        if self.needs_full || banner != self.last_banner {
            let row = self.origin_y + self.height as u16;
            self.draw_line(out, row, &banner, Color::Yellow)?;
            self.last_banner = banner;
        }
        self.needs_full = false;

        out.flush()
    }

    fn draw_line<W: Write>(
        &self,
        out: &mut W,
        row: u16,
        text: &str,
        color: Color,
    ) -> io::Result<()> {
        out.queue(MoveTo(self.origin_x, row))?;
        out.queue(Clear(ClearType::CurrentLine))?;
        out.queue(SetForegroundColor(color))?;
        out.queue(Print(text))?;
        out.queue(ResetColor)?;
        Ok(())
    }

    fn draw_cell<W: Write>(&self, out: &mut W, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = cell.glyph.text();
        let x_pos = self.origin_x + (x * self.cell_w) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < self.cell_w {
            for _ in 0..(self.cell_w - w) {
                out.queue(Print(' '))?;
            }
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use crate::config::GameTuning;
    use crate::game::Session;

    fn session() -> Session {
        let tuning = GameTuning {
            seed: Some(9),
            ..GameTuning::default()
        };
        Session::new(tuning, 1200)
    }

    #[test]
    fn glyphs_fit_the_cell() {
        for glyph in [
            Glyph::Player(Direction::Right),
            Glyph::Player(Direction::Up),
            Glyph::Ghost,
            Glyph::Eyes,
            Glyph::Wall,
            Glyph::Pellet,
            Glyph::Power,
            Glyph::Gate,
        ] {
            assert!(UnicodeWidthStr::width(glyph.text()) <= CELL_W, "{:?}", glyph);
        }
    }

    #[test]
    fn player_drawn_over_ghost() {
        let mut s = session();
        let pos = s.player().pos;
        s.ghosts_mut()[0].pos = pos;
        let snap = s.snapshot();
        let cell = cell_for(s.maze(), &snap, Tile::new(13, 23));
        assert_eq!(cell.glyph, Glyph::Player(Direction::Up));
    }

    #[test]
    fn ghost_cells_follow_mode() {
        let mut s = session();
        s.ghosts_mut()[1].pos = Position::new(1.0, 1.0);
        s.ghosts_mut()[2].pos = Position::new(6.0, 5.0);
        s.ghosts_mut()[2].mark_eaten();
        let snap = s.snapshot();
        assert_eq!(
            cell_for(s.maze(), &snap, Tile::new(1, 1)),
            Cell::new(Glyph::Ghost, Color::Magenta)
        );
        assert_eq!(cell_for(s.maze(), &snap, Tile::new(6, 5)).glyph, Glyph::Eyes);
        assert_eq!(cell_for(s.maze(), &snap, Tile::new(0, 0)).glyph, Glyph::Wall);
        assert_eq!(cell_for(s.maze(), &snap, Tile::new(1, 3)).glyph, Glyph::Power);
        assert_eq!(cell_for(s.maze(), &snap, Tile::new(13, 12)).glyph, Glyph::Gate);
    }

    #[test]
    fn hud_and_banner_text() {
        let s = session();
        let snap = s.snapshot();
        assert_eq!(
            hud_line(&snap),
            "Score: 0  High: 1200  Lives: 3  Level: 1  Pellets: 244"
        );
        assert!(banner_line(&snap).contains("Enter"));
    }

    #[test]
    fn too_small_terminal_reports_size() {
        let s = session();
        let mut renderer = Renderer::new(28, 31, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out, s.maze(), &s.snapshot(), (40, 10)).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Terminal too small. Need at least 56x33"));
    }

    #[test]
    fn unchanged_frame_redraws_nothing() {
        let mut s = session();
        s.start();
        let mut renderer = Renderer::new(28, 31, 2);
        let mut first = Vec::new();
        renderer.draw(&mut first, s.maze(), &s.snapshot(), (80, 40)).unwrap();
        assert!(String::from_utf8_lossy(&first).contains("Score: 0"));

        let mut second = Vec::new();
        renderer.draw(&mut second, s.maze(), &s.snapshot(), (80, 40)).unwrap();
        assert!(second.len() < first.len() / 20);

        renderer.invalidate();
        let mut third = Vec::new();
        renderer.draw(&mut third, s.maze(), &s.snapshot(), (80, 40)).unwrap();
        assert!(third.len() >= first.len() / 2);
    }
}
