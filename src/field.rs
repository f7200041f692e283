use std::ops::{Index, IndexMut};

use crate::cell::Cell;
use crate::error::RasterError;

/// An addressable two-dimensional arena of pixel records.  Cells live in
/// one flat row-major allocation at the storage width; everything that
/// needs to go from coordinates to storage goes through `index_of`, to
/// keep the index math in a singular location.
#[derive(Debug, Clone)]
pub struct PixelField {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl PixelField {
    /// Allocate a `width x height` arena in one piece.  Failing to get
    /// the memory is an error to hand back, not a crash.
    pub fn new(width: u32, height: u32) -> Result<PixelField, RasterError> {
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RasterError::Allocation { width, height })?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| RasterError::Allocation { width, height })?;
        cells.resize(count, Cell::default());
        Ok(PixelField {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Bounds-checked access for the public boundary.
    pub fn get(&self, x: u32, y: u32) -> Result<&Cell, RasterError> {
        if x >= self.width || y >= self.height {
            return Err(RasterError::OutOfRange {
                x,
                y,
                w: self.width,
                h: self.height,
            });
        }
        Ok(&self.cells[self.index_of(x, y)])
    }

    /// The visibility predicate, in one place: a cell is visible at
    /// `level` unless a strictly earlier seam claimed it.
    pub fn is_visible(&self, idx: usize, level: u32) -> bool {
        let vs = self.cells[idx].visibility;
        vs == 0 || vs >= level
    }

    /// Forget every seam ever recorded.
    pub fn reset_visibility(&mut self) {
        for cell in &mut self.cells {
            cell.visibility = 0;
        }
    }
}

impl Index<(u32, u32)> for PixelField {
    type Output = Cell;

    fn index(&self, (x, y): (u32, u32)) -> &Cell {
        &self.cells[self.index_of(x, y)]
    }
}

impl IndexMut<(u32, u32)> for PixelField {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut Cell {
        let idx = self.index_of(x, y);
        &mut self.cells[idx]
    }
}

impl Index<usize> for PixelField {
    type Output = Cell;

    fn index(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }
}

impl IndexMut<usize> for PixelField {
    fn index_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }
}
