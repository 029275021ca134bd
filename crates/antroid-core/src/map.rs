//! Sparse grid maps and the per-turn visibility they carry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Absolute position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Facing direction, expressed as an offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// What a cell contains
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellContent {
    Grass,
    Sugar,
    Rock,
    Mill,
    Water,
    Meat,
    /// A kind the harness has no code for
    Unknown(String),
}

impl CellContent {
    /// Integer code used by the turn-state message
    pub fn code(&self) -> u8 {
        match self {
            CellContent::Grass => 0,
            CellContent::Sugar => 1,
            CellContent::Rock => 2,
            CellContent::Mill => 3,
            CellContent::Water => 4,
            CellContent::Meat => 5,
            CellContent::Unknown(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CellContent::Grass => "grass",
            CellContent::Sugar => "sugar",
            CellContent::Rock => "rock",
            CellContent::Mill => "mill",
            CellContent::Water => "water",
            CellContent::Meat => "meat",
            CellContent::Unknown(kind) => kind,
        }
    }
}

impl From<&str> for CellContent {
    fn from(kind: &str) -> Self {
        match kind {
            "grass" => CellContent::Grass,
            "sugar" => CellContent::Sugar,
            "rock" => CellContent::Rock,
            "mill" => CellContent::Mill,
            "water" => CellContent::Water,
            "meat" => CellContent::Meat,
            other => CellContent::Unknown(other.to_string()),
        }
    }
}

impl From<String> for CellContent {
    fn from(kind: String) -> Self {
        CellContent::from(kind.as_str())
    }
}

impl From<CellContent> for String {
    fn from(content: CellContent) -> Self {
        content.as_str().to_string()
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positioned cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub pos: Position,
    pub content: CellContent,
    /// Seen by at least one ant this turn
    #[serde(default)]
    pub visible: bool,
}

impl Cell {
    pub fn new(pos: Position, content: CellContent) -> Self {
        Self {
            pos,
            content,
            visible: false,
        }
    }
}

/// Anything that can be looked at as a grid
pub trait GridMap {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn cell(&self, x: i32, y: i32) -> Option<&Cell>;
    /// Known cells, ordered by position
    fn known_cells(&self) -> Box<dyn Iterator<Item = &Cell> + '_>;
}

/// A sparse part of the map
///
/// Cells are keyed by position, so a position is never stored twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialMap {
    cells: BTreeMap<Position, Cell>,
}

impl PartialMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell, replacing whatever was known at its position
    pub fn insert(&mut self, cell: Cell) {
        self.cells.insert(cell.pos, cell);
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Merge other maps into this one; later maps win on shared positions
    pub fn combine<'a>(&mut self, maps: impl IntoIterator<Item = &'a PartialMap>) {
        for map in maps {
            for (pos, cell) in &map.cells {
                self.cells.insert(*pos, cell.clone());
            }
        }
    }

    /// New map holding the union of `maps`, later ones winning
    pub fn combine_all<'a>(maps: impl IntoIterator<Item = &'a PartialMap>) -> Self {
        let mut combined = Self::new();
        combined.combine(maps);
        combined
    }

    pub fn set_visibility(&mut self, visible: bool) {
        for cell in self.cells.values_mut() {
            cell.visible = visible;
        }
    }

    pub fn reset_visibility(&mut self) {
        self.set_visibility(false);
    }
}

impl FromIterator<Cell> for PartialMap {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        let mut map = Self::new();
        for cell in iter {
            map.insert(cell);
        }
        map
    }
}

impl GridMap for PartialMap {
    /// Highest known x plus one, or 0 for an empty map
    fn width(&self) -> i32 {
        self.cells.keys().map(|p| p.x).max().map_or(0, |x| (x + 1).max(0))
    }

    /// Highest known y plus one, or 0 for an empty map
    fn height(&self) -> i32 {
        self.cells.keys().map(|p| p.y).max().map_or(0, |y| (y + 1).max(0))
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.get(&Position::new(x, y))
    }

    fn known_cells(&self) -> Box<dyn Iterator<Item = &Cell> + '_> {
        Box::new(self.cells.values())
    }
}

/// A map whose dimensions are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    cells: PartialMap,
    width: i32,
    height: i32,
}

impl Map {
    pub fn new(cells: PartialMap, width: i32, height: i32) -> Self {
        Self {
            cells,
            width,
            height,
        }
    }
}

impl GridMap for Map {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.cell(x, y)
    }

    fn known_cells(&self) -> Box<dyn Iterator<Item = &Cell> + '_> {
        self.cells.known_cells()
    }
}
