use crate::components::{CellKind, Direction, PelletKind, Tile};

pub const COLS: usize = 28;
pub const ROWS: usize = 31;

/// Layout vocabulary: `W` wall, `.` pellet, `o` power pellet, `T` tunnel,
/// ` ` open, `G` ghost-house gate, `P` player spawn, `B`/`N`/`I`/`C` ghost
/// spawns in identity order.
pub const MAZE_RAW: [&str; ROWS] = [
    "WWWWWWWWWWWWWWWWWWWWWWWWWWWW",
    "W............WW............W",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "WoWWWW.WWWWW.WW.WWWWW.WWWWoW",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "W..........................W",
    "W.WWWW.WW.WWWWWWWW.WW.WWWW.W",
    "W.WWWW.WW.WWWWWWWW.WW.WWWW.W",
    "W......WW....WW....WW......W",
    "WWWWWW.WWWWW WW WWWWW.WWWWWW",
    "WWWWWW.WWWWW WW WWWWW.WWWWWW",
    "WWWWWW.WW          WW.WWWWWW",
    "WWWWWW.WW WWWGGWWW WW.WWWWWW",
    "WWWWWW.WW W      W WW.WWWWWW",
    "T     .   W BNIC W   .     T",
    "WWWWWW.WW W      W WW.WWWWWW",
    "WWWWWW.WW WWWWWWWW WW.WWWWWW",
    "WWWWWW.WW          WW.WWWWWW",
    "WWWWWW.WW WWWWWWWW WW.WWWWWW",
    "WWWWWW.WW WWWWWWWW WW.WWWWWW",
    "W............WW............W",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "W.WWWW.WWWWW.WW.WWWWW.WWWW.W",
    "Wo..WW.......P .......WW..oW",
    "WWW.WW.WW.WWWWWWWW.WW.WW.WWW",
    "WWW.WW.WW.WWWWWWWW.WW.WW.WWW",
    "W......WW....WW....WW......W",
    "W.WWWWWWWWWW.WW.WWWWWWWWWW.W",
    "W.WWWWWWWWWW.WW.WWWWWWWWWW.W",
    "W..........................W",
    "WWWWWWWWWWWWWWWWWWWWWWWWWWWW",
];

const GHOST_MARKERS: [char; 4] = ['B', 'N', 'I', 'C'];

/// Immutable geometry parsed from a layout table.
#[derive(Debug, Clone)]
pub struct LevelData {
    width: usize,
    height: usize,
    grid: Vec<CellKind>,
    pub player_start: Tile,
    pub ghost_starts: [Tile; 4],
    /// Tile above the ghost-house gate; eaten ghosts revive here.
    pub home: Tile,
    /// Ghost-house interior: open tiles reachable from the ghost starts
    /// without crossing a gate.
    house: Vec<bool>,
}

impl LevelData {
    pub fn classic() -> Self {
        Self::parse(&MAZE_RAW)
    }

    /// Rows shorter than the widest row are padded with walls. Tunnel
    /// markers away from the left/right edge, or on the top/bottom row,
    /// are demoted to open floor.
    pub fn parse(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = vec![CellKind::Wall; width * height];
        let mut player_start = None;
        let mut ghost_starts: [Option<Tile>; 4] = [None; 4];
        let mut gate = None;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = Tile::new(x as i32, y as i32);
                let on_side_edge = x == 0 || x + 1 == width;
                let interior_row = y > 0 && y + 1 < height;
                let kind = match ch {
                    'W' => CellKind::Wall,
                    '.' => CellKind::Pellet,
                    'o' => CellKind::PowerPellet,
                    'T' if on_side_edge && interior_row => CellKind::Tunnel,
                    'T' | ' ' => CellKind::Open,
                    'G' => {
                        gate.get_or_insert(tile);
                        CellKind::Gate
                    }
                    'P' => {
                        player_start = Some(tile);
                        CellKind::Spawn
                    }
                    c => match GHOST_MARKERS.iter().position(|m| *m == c) {
                        Some(idx) => {
                            ghost_starts[idx] = Some(tile);
                            CellKind::Spawn
                        }
                        None => CellKind::Open,
                    },
                };
                grid[y * width + x] = kind;
            }
        }

        let fallback = grid
            .iter()
            .position(|k| !k.is_wall())
            .map(|idx| Tile::new((idx % width.max(1)) as i32, (idx / width.max(1)) as i32))
            .unwrap_or(Tile::new(0, 0));
        let player_start = player_start.unwrap_or(fallback);
        let ghost_starts = ghost_starts.map(|t| t.unwrap_or(player_start));
        let home = gate.map_or(ghost_starts[0], |g| g.step(Direction::Up));

        let mut level = LevelData {
            width,
            height,
            grid,
            player_start,
            ghost_starts,
            home,
            house: Vec::new(),
        };
        if gate.is_some() {
            level.house = level.flood_house();
        }
        level
    }

    fn flood_house(&self) -> Vec<bool> {
        let mut house = vec![false; self.grid.len()];
        let mut stack: Vec<Tile> = self.ghost_starts.to_vec();
        while let Some(tile) = stack.pop() {
            let Some(idx) = self.index(tile) else {
                continue;
            };
            let kind = self.grid[idx];
            if house[idx] || kind.is_wall() || kind == CellKind::Gate {
                continue;
            }
            house[idx] = true;
            stack.extend(Direction::SEARCH_ORDER.map(|dir| tile.step(dir)));
        }
        house
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if tile.x < 0 || tile.y < 0 {
            return None;
        }
        let (x, y) = (tile.x as usize, tile.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn kind(&self, tile: Tile) -> CellKind {
        self.index(tile).map_or(CellKind::Wall, |i| self.grid[i])
    }

    pub fn count_pellets(&self) -> usize {
        self.grid
            .iter()
            .filter(|&&cell| cell == CellKind::Pellet || cell == CellKind::PowerPellet)
            .count()
    }
}

/// Static layout plus the per-session working copy that pellets are eaten from.
#[derive(Debug, Clone)]
pub struct Maze {
    level: LevelData,
    cells: Vec<CellKind>,
    pellets_left: usize,
}

impl Maze {
    pub fn new(level: LevelData) -> Self {
        let cells = level.grid.clone();
        let pellets_left = level.count_pellets();
        Maze {
            level,
            cells,
            pellets_left,
        }
    }

    pub fn classic() -> Self {
        Self::new(LevelData::classic())
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn width(&self) -> i32 {
        self.level.width as i32
    }

    pub fn height(&self) -> i32 {
        self.level.height as i32
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        self.level.index(tile).is_some()
    }

    /// Anything off the grid counts as wall.
    pub fn is_wall(&self, tile: Tile) -> bool {
        self.level.kind(tile).is_wall()
    }

    pub fn is_gate(&self, tile: Tile) -> bool {
        self.level.kind(tile) == CellKind::Gate
    }

    /// The player may not enter the ghost house.
    pub fn blocks_player(&self, tile: Tile) -> bool {
        let kind = self.level.kind(tile);
        kind.is_wall() || kind == CellKind::Gate
    }

    pub fn in_house(&self, tile: Tile) -> bool {
        self.level
            .index(tile)
            .and_then(|i| self.level.house.get(i).copied())
            .unwrap_or(false)
    }

    /// Walls always block a ghost; gates only when `gate_open` is false.
    pub fn blocks_ghost(&self, tile: Tile, gate_open: bool) -> bool {
        match self.level.kind(tile) {
            CellKind::Gate => !gate_open,
            kind => kind.is_wall(),
        }
    }

    /// Working-copy cell, reflecting eaten pellets.
    pub fn cell_at(&self, tile: Tile) -> CellKind {
        self.level.index(tile).map_or(CellKind::Wall, |i| self.cells[i])
    }

    /// Layout cell, never changes during play.
    pub fn layout_at(&self, tile: Tile) -> CellKind {
        self.level.kind(tile)
    }

    pub fn consume(&mut self, tile: Tile) -> Option<PelletKind> {
        let idx = self.level.index(tile)?;
        let eaten = match self.cells[idx] {
            CellKind::Pellet => PelletKind::Normal,
            CellKind::PowerPellet => PelletKind::Power,
            _ => return None,
        };
        self.cells[idx] = CellKind::Open;
        self.pellets_left = self.pellets_left.saturating_sub(1);
        Some(eaten)
    }

    pub fn pellets_left(&self) -> usize {
        self.pellets_left
    }

    pub fn reset(&mut self) {
        self.cells.clone_from(&self.level.grid);
        self.pellets_left = self.level.count_pellets();
    }

    /// Opposite-edge tile reached by leaving a tunnel cell outward.
    pub fn wrap_target(&self, tile: Tile, dir: Direction) -> Option<Tile> {
        if self.layout_at(tile) != CellKind::Tunnel {
            return None;
        }
        let last = self.width() - 1;
        match dir {
            Direction::Left if tile.x == 0 => Some(Tile::new(last, tile.y)),
            Direction::Right if tile.x == last => Some(Tile::new(0, tile.y)),
            _ => None,
        }
    }

    /// Tile reached by leaving `tile` in `dir`, with tunnel wrap, if it is
    /// not blocked.
    pub fn exit<F>(&self, tile: Tile, dir: Direction, blocked: F) -> Option<Tile>
    where
        F: Fn(Tile) -> bool,
    {
        if dir.is_none() {
            return None;
        }
        let next = self.wrap_target(tile, dir).unwrap_or_else(|| tile.step(dir));
        (!blocked(next)).then_some(next)
    }

    /// Pellet draw list, rebuilt from the working copy.
    pub fn pellets(&self) -> impl Iterator<Item = (Tile, PelletKind)> + '_ {
        let width = self.level.width;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            let tile = Tile::new((idx % width) as i32, (idx / width) as i32);
            match cell {
                CellKind::Pellet => Some((tile, PelletKind::Normal)),
                CellKind::PowerPellet => Some((tile, PelletKind::Power)),
                _ => None,
            }
        })
    }
}

impl Default for Maze {
    fn default() -> Self {
        Self::classic()
    }
}
