//! Board module - the grid store
//!
//! The board is a fixed `width x height` grid where each cell is either empty or
//! owned by exactly one piece. Uses a flat array for cache locality.
//! Coordinates: (x, y) where x ranges `0..width` and y ranges `0..height`.
//!
//! The board knows nothing about shapes, rotation, or colors. Writes never check
//! for conflicts: callers detach a piece before re-registering it, which is what
//! lets [`Piece`](crate::piece::Piece) build atomic multi-cell transactions on top.

use derive_more::{Display, Error};

use crate::types::{Cell, Coord, PieceId};

/// Board construction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    #[display("board dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u16, height: u16 },
}

/// The grid store - flat row-major cell storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: u16,
    height: u16,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: u16, height: u16) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        })
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, c: Coord) -> Option<usize> {
        if !self.is_valid_coord(c) {
            return None;
        }
        Some(c.y as usize * self.width as usize + c.x as usize)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// True iff `0 <= x < width` and `0 <= y < height`
    #[inline]
    pub fn is_valid_coord(&self, c: Coord) -> bool {
        c.x >= 0 && c.x < self.width as i32 && c.y >= 0 && c.y < self.height as i32
    }

    /// Get cell at `c`
    /// Returns None if out of bounds
    pub fn get(&self, c: Coord) -> Option<Cell> {
        self.index(c).map(|idx| self.cells[idx])
    }

    /// Piece occupying `c`, if any. Out-of-range queries simply yield `None`.
    pub fn occupant_at(&self, c: Coord) -> Option<PieceId> {
        self.get(c).flatten()
    }

    /// Register `id` at `c`, overwriting any previous occupant.
    ///
    /// Returns false (and logs the anomaly) if `c` is out of range.
    pub fn place(&mut self, id: PieceId, c: Coord) -> bool {
        match self.index(c) {
            Some(idx) => {
                self.cells[idx] = Some(id);
                true
            }
            None => {
                log::warn!(
                    "board: ignoring write of piece {} at out-of-range cell ({}, {})",
                    id.0,
                    c.x,
                    c.y
                );
                false
            }
        }
    }

    /// Clear the occupant at `c`. No-op (returns false) if out of range.
    pub fn remove(&mut self, c: Coord) -> bool {
        match self.index(c) {
            Some(idx) => {
                self.cells[idx] = None;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and empty
    pub fn is_free(&self, c: Coord) -> bool {
        matches!(self.get(c), Some(None))
    }

    /// All cells currently attributed to `id`, in row-major order
    pub fn cells_of(&self, id: PieceId) -> impl Iterator<Item = Coord> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| **cell == Some(id))
            .map(move |(idx, _)| Coord::new((idx % width) as i32, (idx / width) as i32))
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Convert to rows for display, top row (highest y) first
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        let width = self.width as usize;
        self.cells
            .chunks(width)
            .rev()
            .map(|row| row.to_vec())
            .collect()
    }
}
