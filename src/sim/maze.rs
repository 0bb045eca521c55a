//! Maze layout and cell-to-world mapping
//!
//! The grid is centred on the world origin: one world unit per cell, rows
//! along +Z and columns along +X, the floor at y = 0.

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{SPAWN_HEIGHT, WALL_CENTER_Y};
use crate::error::LayoutError;

/// The reference 10×10 labyrinth (1 = wall, 0 = path, 2 = start, 3 = goal)
pub const REFERENCE_MAZE: [[u8; 10]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 0, 0, 1, 0, 0, 0, 0, 1],
    [1, 1, 1, 0, 1, 0, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1, 0, 1],
    [1, 0, 1, 1, 1, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 0, 1, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 0, 1, 1, 1, 3, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cell {
    Wall,
    Path,
    Start,
    Goal,
}

impl Cell {
    /// Cells the ball can occupy
    pub fn is_walkable(self) -> bool {
        self != Cell::Wall
    }

    /// ASCII form used by [`MazeLayout::parse`]
    pub fn as_char(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Path => '.',
            Cell::Start => 'S',
            Cell::Goal => 'G',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' | '1' => Some(Cell::Wall),
            '.' | ' ' | '0' => Some(Cell::Path),
            'S' | 's' | '2' => Some(Cell::Start),
            'G' | 'g' | '3' => Some(Cell::Goal),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Cell::Path),
            1 => Ok(Cell::Wall),
            2 => Ok(Cell::Start),
            3 => Ok(Cell::Goal),
            other => Err(format!("unknown cell code {other}")),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Path => 0,
            Cell::Wall => 1,
            Cell::Start => 2,
            Cell::Goal => 3,
        }
    }
}

/// Circular win-trigger zone on the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalZone {
    pub center: Vec3,
    pub radius: f32,
}

/// Immutable, validated maze grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct MazeLayout {
    rows: usize,
    cols: usize,
    /// Row-major cells
    cells: Vec<Cell>,
    start: (usize, usize),
    goal: (usize, usize),
}

impl MazeLayout {
    /// Validate a grid and build a layout from it
    ///
    /// The grid must be non-empty and rectangular with exactly one start and
    /// exactly one goal cell.
    pub fn build(grid: Vec<Vec<Cell>>) -> Result<Self, LayoutError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(LayoutError::Empty);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        let mut starts = Vec::new();
        let mut goals = Vec::new();
        for (row, line) in grid.into_iter().enumerate() {
            if line.len() != cols {
                return Err(LayoutError::NotRectangular {
                    row,
                    expected: cols,
                    found: line.len(),
                });
            }
            for (col, cell) in line.into_iter().enumerate() {
                match cell {
                    Cell::Start => starts.push((row, col)),
                    Cell::Goal => goals.push((row, col)),
                    Cell::Wall | Cell::Path => {}
                }
                cells.push(cell);
            }
        }

        if starts.len() != 1 {
            return Err(LayoutError::StartCount(starts.len()));
        }
        if goals.len() != 1 {
            return Err(LayoutError::GoalCount(goals.len()));
        }

        log::debug!("Built {rows}x{cols} maze layout");
        Ok(Self {
            rows,
            cols,
            cells,
            start: starts[0],
            goal: goals[0],
        })
    }

    /// Build from numeric cell codes (1 = wall, 0 = path, 2 = start, 3 = goal)
    pub fn from_codes<R: AsRef<[u8]>>(codes: &[R]) -> Result<Self, LayoutError> {
        let mut grid = Vec::with_capacity(codes.len());
        for (row, line) in codes.iter().enumerate() {
            let mut cells = Vec::with_capacity(line.as_ref().len());
            for (col, &code) in line.as_ref().iter().enumerate() {
                let cell = Cell::try_from(code).map_err(|_| LayoutError::UnknownCell {
                    token: code.to_string(),
                    row,
                    col,
                })?;
                cells.push(cell);
            }
            grid.push(cells);
        }
        Self::build(grid)
    }

    /// Parse an ASCII layout, one row per non-blank line
    ///
    /// `#` wall, `.` or space path, `S` start, `G` goal (digits 0-3 are
    /// accepted too). Trailing spaces are path cells, not padding.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let mut grid = Vec::new();
        for line in text
            .lines()
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .filter(|l| !l.trim().is_empty())
        {
            let row = grid.len();
            let mut cells = Vec::with_capacity(line.len());
            for (col, c) in line.chars().enumerate() {
                let cell = Cell::from_char(c).ok_or_else(|| LayoutError::UnknownCell {
                    token: c.to_string(),
                    row,
                    col,
                })?;
                cells.push(cell);
            }
            grid.push(cells);
        }
        Self::build(grid)
    }

    /// Load a layout file: JSON rows of cell codes (`.json`) or ASCII otherwise
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| crate::Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layout = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&text)?
        } else {
            Self::parse(&text)?
        };
        log::debug!("Loaded maze layout from {}", path.display());
        Ok(layout)
    }

    /// The reference 10×10 labyrinth
    pub fn reference() -> Self {
        match Self::from_codes(&REFERENCE_MAZE) {
            Ok(layout) => layout,
            Err(e) => unreachable!("reference maze is valid: {e}"),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at (row, col), `None` outside the grid
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    pub fn is_walkable(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(Cell::is_walkable)
    }

    /// Grid coordinates of the start cell
    pub fn start_cell(&self) -> (usize, usize) {
        self.start
    }

    /// Grid coordinates of the goal cell
    pub fn goal_cell(&self) -> (usize, usize) {
        self.goal
    }

    /// Floor-level world position of a cell centre
    pub fn cell_to_world(&self, row: usize, col: usize) -> Vec3 {
        Vec3::new(
            col as f32 - self.cols as f32 / 2.0 + 0.5,
            0.0,
            row as f32 - self.rows as f32 / 2.0 + 0.5,
        )
    }

    /// Cell containing a world position (height ignored)
    pub fn world_to_cell(&self, pos: Vec3) -> Option<(usize, usize)> {
        let col = (pos.x + self.cols as f32 / 2.0).floor();
        let row = (pos.z + self.rows as f32 / 2.0).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// World-space centres of every wall cube, in row-major order
    pub fn wall_positions(&self) -> WallPositions<'_> {
        WallPositions {
            layout: self,
            index: 0,
        }
    }

    /// Number of wall cells
    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Wall).count()
    }

    /// Spawn point: one unit above the start cell
    pub fn start_position(&self) -> Vec3 {
        let (row, col) = self.start;
        self.cell_to_world(row, col).with_y(SPAWN_HEIGHT)
    }

    /// Goal centre on the floor plane
    pub fn goal_position(&self) -> Vec3 {
        let (row, col) = self.goal;
        self.cell_to_world(row, col)
    }

    /// Goal zone with the given trigger radius
    pub fn goal_zone(&self, radius: f32) -> GoalZone {
        GoalZone {
            center: self.goal_position(),
            radius,
        }
    }

    /// Rows of cells (for serialization and display)
    pub fn grid(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.cols).map(<[Cell]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<Cell>>> for MazeLayout {
    type Error = LayoutError;

    fn try_from(grid: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Self::build(grid)
    }
}

impl From<MazeLayout> for Vec<Vec<Cell>> {
    fn from(layout: MazeLayout) -> Self {
        layout.grid()
    }
}

impl fmt::Display for MazeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(|c| c.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Iterator over wall centres; clone it (or call `wall_positions` again) to restart
#[derive(Debug, Clone)]
pub struct WallPositions<'a> {
    layout: &'a MazeLayout,
    index: usize,
}

impl Iterator for WallPositions<'_> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        let layout = self.layout;
        while self.index < layout.cells.len() {
            let index = self.index;
            self.index += 1;
            if layout.cells[index] == Cell::Wall {
                let (row, col) = (index / layout.cols, index % layout.cols);
                return Some(layout.cell_to_world(row, col).with_y(WALL_CENTER_Y));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.layout.cells.len() - self.index))
    }
}
