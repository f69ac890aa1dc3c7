//! Grid coordinates, footprints and cell occupancy.

use crate::flavor::Flavor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Flat index of a grid cell (`x + width * y`)
pub type Cell = usize;

/// Fixed size of the puzzle field, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(13, 10)
    }
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn x(&self, cell: Cell) -> usize {
        cell % self.width
    }

    pub fn y(&self, cell: Cell) -> usize {
        cell / self.width
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        x + self.width * y
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell < self.cell_count()
    }

    /// Iterate over every cell index
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        0..self.cell_count()
    }

    /// Human-readable coordinate: column letter followed by the 1-based row (`A1`, `M10`)
    pub fn label(&self, cell: Cell) -> String {
        let column = (b'A' + (self.x(cell) % 26) as u8) as char;
        format!("{}{}", column, self.y(cell) + 1)
    }

    /// Top-left cells at which a `width`×`height` rectangle fits inside the grid,
    /// ignoring occupancy
    pub fn rect_origins(&self, width: usize, height: usize) -> impl Iterator<Item = Cell> + '_ {
        self.cells()
            .filter(move |&c| self.x(c) + width <= self.width && self.y(c) + height <= self.height)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The set of cells a component permanently occupies. Always sorted and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    cells: Vec<Cell>,
}

impl Footprint {
    /// Build a footprint from arbitrary cells (a wire spans two unrelated cells)
    pub fn from_cells(mut cells: Vec<Cell>) -> Self {
        cells.sort_unstable();
        cells.dedup();
        debug_assert!(!cells.is_empty(), "footprint must claim at least one cell");
        Self { cells }
    }

    /// Axis-aligned rectangle anchored at its top-left cell
    pub fn rect(grid: GridSize, top_left: Cell, width: usize, height: usize) -> Self {
        let (x, y) = (grid.x(top_left), grid.y(top_left));
        let cells = (0..height)
            .flat_map(|dy| (0..width).map(move |dx| grid.cell(x + dx, y + dy)))
            .collect();
        Self::from_cells(cells)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Smallest cell index, which is the top-left cell of a rectangle
    pub fn anchor(&self) -> Cell {
        self.cells[0]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    pub fn overlaps(&self, other: &Footprint) -> bool {
        self.cells.iter().any(|&c| other.contains(c))
    }
}

/// Claimed cells and uniqueness tokens for one generation attempt
#[derive(Debug, Clone)]
pub struct Occupancy {
    grid: GridSize,
    cells: HashSet<Cell>,
    flavors: HashSet<Flavor>,
}

impl Occupancy {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            cells: HashSet::new(),
            flavors: HashSet::new(),
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn is_cell_free(&self, cell: Cell) -> bool {
        self.grid.contains(cell) && !self.cells.contains(&cell)
    }

    pub fn free_cells(&self) -> Vec<Cell> {
        self.grid.cells().filter(|&c| !self.cells.contains(&c)).collect()
    }

    /// A footprint is available iff every cell is in bounds and unclaimed
    pub fn is_available(&self, footprint: &Footprint) -> bool {
        footprint.cells().iter().all(|&c| self.is_cell_free(c))
    }

    /// Whether a `width`×`height` rectangle anchored at `top_left` fits and is unclaimed
    pub fn is_rect_available(&self, top_left: Cell, width: usize, height: usize) -> bool {
        if !self.grid.contains(top_left) {
            return false;
        }
        let (x, y) = (self.grid.x(top_left), self.grid.y(top_left));
        if x + width > self.grid.width || y + height > self.grid.height {
            return false;
        }
        (0..height).all(|dy| (0..width).all(|dx| !self.cells.contains(&self.grid.cell(x + dx, y + dy))))
    }

    /// Every top-left cell where a free `width`×`height` rectangle could go
    pub fn rect_spots(&self, width: usize, height: usize) -> Vec<Cell> {
        self.grid
            .rect_origins(width, height)
            .filter(|&c| self.is_rect_available(c, width, height))
            .collect()
    }

    pub fn is_flavor_taken(&self, flavor: Flavor) -> bool {
        self.flavors.contains(&flavor)
    }

    /// Record a placed component. Non-unique flavors are not tracked.
    pub fn claim(&mut self, footprint: &Footprint, flavor: Flavor) {
        self.cells.extend(footprint.cells().iter().copied());
        if flavor.is_unique() {
            self.flavors.insert(flavor);
        }
    }

    pub fn claimed_cells(&self) -> usize {
        self.cells.len()
    }
}
