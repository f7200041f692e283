// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Walking the visible subset of a pixel field
//!
//! A raster at level `l` hides every cell whose visibility marker is
//! nonzero and below `l`.  The cursor walks the cells that remain, in
//! raster order, keeping the raw index and the logical coordinates in
//! step so neighbour lookups stay cheap.

use crate::error::RasterError;
use crate::field::PixelField;

/// The logical dimensions a cursor moves in: the current visible width
/// and height, and the level that decides which cells count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub w: u32,
    pub h: u32,
    pub level: u32,
}

/// A position in the visible grid.  `now` is the raw index into the
/// backing field; `x` and `y` are the logical coordinates it
/// corresponds to at the frame's level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub now: usize,
    pub x: u32,
    pub y: u32,
}

fn skip_forward(field: &PixelField, level: u32, mut idx: usize) -> usize {
    while !field.is_visible(idx, level) {
        idx += 1;
    }
    idx
}

fn skip_backward(field: &PixelField, level: u32, mut idx: usize) -> usize {
    while !field.is_visible(idx, level) {
        idx -= 1;
    }
    idx
}

impl Cursor {
    /// A cursor on the first visible cell, logical `(0, 0)`.
    pub fn start(field: &PixelField, frame: Frame) -> Cursor {
        Cursor {
            now: skip_forward(field, frame.level, 0),
            x: 0,
            y: 0,
        }
    }

    /// A cursor on logical `(x, y)`.  Walks the target row from its
    /// raw start, counting visible cells until the x-th one.
    pub fn at(field: &PixelField, frame: Frame, x: u32, y: u32) -> Result<Cursor, RasterError> {
        if x >= frame.w || y >= frame.h {
            return Err(RasterError::OutOfRange {
                x,
                y,
                w: frame.w,
                h: frame.h,
            });
        }
        let mut now = y as usize * field.width() as usize;
        for _ in 0..x {
            now = skip_forward(field, frame.level, now);
            now += 1;
        }
        let now = skip_forward(field, frame.level, now);
        debug_assert!(now < (y as usize + 1) * field.width() as usize);
        Ok(Cursor { now, x, y })
    }

    /// Reposition this cursor on logical `(x, y)`.
    pub fn seek(
        &mut self,
        field: &PixelField,
        frame: Frame,
        x: u32,
        y: u32,
    ) -> Result<(), RasterError> {
        *self = Cursor::at(field, frame, x, y)?;
        Ok(())
    }

    /// Step to the next visible cell in raster order.  A no-op on the
    /// last cell of the frame.
    pub fn advance(&mut self, field: &PixelField, frame: Frame) {
        if self.x + 1 == frame.w && self.y + 1 == frame.h {
            return;
        }
        if self.x + 1 == frame.w {
            self.x = 0;
            self.y += 1;
        } else {
            self.x += 1;
        }
        self.now += 1;
        debug_assert!(self.now < field.len());
        self.now = skip_forward(field, frame.level, self.now);
    }

    /// Step to the previous visible cell in raster order.  A no-op on
    /// the first cell of the frame.
    pub fn retreat(&mut self, field: &PixelField, frame: Frame) {
        if self.x == 0 && self.y == 0 {
            return;
        }
        if self.x == 0 {
            self.x = frame.w - 1;
            self.y -= 1;
        } else {
            self.x -= 1;
        }
        debug_assert!(self.now > 0);
        self.now -= 1;
        self.now = skip_backward(field, frame.level, self.now);
    }

    /// Raw index of the visible cell to the right of this one.
    pub fn right(&self, field: &PixelField, frame: Frame) -> Result<usize, RasterError> {
        if self.x + 1 >= frame.w {
            return Err(RasterError::Boundary {
                x: self.x,
                y: self.y,
            });
        }
        Ok(skip_forward(field, frame.level, self.now + 1))
    }

    /// Raw index of the visible cell to the left of this one.
    pub fn left(&self, field: &PixelField, frame: Frame) -> Result<usize, RasterError> {
        if self.x == 0 {
            return Err(RasterError::Boundary {
                x: self.x,
                y: self.y,
            });
        }
        Ok(skip_backward(field, frame.level, self.now - 1))
    }

    /// Raw index of the visible cell directly above this one, meaning
    /// the cell at the same logical x in the previous row.
    pub fn up(&self, field: &PixelField, frame: Frame) -> Result<usize, RasterError> {
        if self.y == 0 {
            return Err(RasterError::Boundary {
                x: self.x,
                y: self.y,
            });
        }
        Ok(row_index(field, frame, self.x, self.y - 1))
    }

    /// Raw index of the visible cell directly below this one.
    pub fn down(&self, field: &PixelField, frame: Frame) -> Result<usize, RasterError> {
        if self.y + 1 >= frame.h {
            return Err(RasterError::Boundary {
                x: self.x,
                y: self.y,
            });
        }
        Ok(row_index(field, frame, self.x, self.y + 1))
    }
}

/// Raw index of the x-th visible cell of row y.  The caller has
/// already checked that the row exists.
fn row_index(field: &PixelField, frame: Frame, x: u32, y: u32) -> usize {
    let mut idx = y as usize * field.width() as usize;
    for _ in 0..x {
        idx = skip_forward(field, frame.level, idx);
        idx += 1;
    }
    skip_forward(field, frame.level, idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 4x2 field with (2, 0) and (1, 1) carved out at level 2:
    //
    //   raw:      0  1  2* 3      visible raw: 0 1 3
    //             4  5* 6  7                   4 6 7
    fn carved_field() -> (PixelField, Frame) {
        let mut field = PixelField::new(4, 2).unwrap();
        field[(2, 0)].visibility = 1;
        field[(1, 1)].visibility = 1;
        let frame = Frame {
            w: 3,
            h: 2,
            level: 2,
        };
        (field, frame)
    }

    #[test]
    fn advance_walks_visible_cells_in_raster_order() {
        let (field, frame) = carved_field();
        let mut c = Cursor::start(&field, frame);
        let mut seen = vec![c.now];
        for _ in 0..5 {
            c.advance(&field, frame);
            seen.push(c.now);
        }
        assert_eq!(seen, vec![0, 1, 3, 4, 6, 7]);
        assert_eq!((c.x, c.y), (2, 1));
        c.advance(&field, frame);
        assert_eq!(c.now, 7);
    }

    #[test]
    fn retreat_is_the_inverse_of_advance() {
        let (field, frame) = carved_field();
        let mut c = Cursor::at(&field, frame, 2, 1).unwrap();
        let mut seen = vec![c.now];
        for _ in 0..5 {
            c.retreat(&field, frame);
            seen.push(c.now);
        }
        assert_eq!(seen, vec![7, 6, 4, 3, 1, 0]);
        assert_eq!((c.x, c.y), (0, 0));
        c.retreat(&field, frame);
        assert_eq!(c.now, 0);
    }

    #[test]
    fn at_counts_only_visible_cells() {
        let (field, frame) = carved_field();
        assert_eq!(Cursor::at(&field, frame, 2, 0).unwrap().now, 3);
        assert_eq!(Cursor::at(&field, frame, 1, 1).unwrap().now, 6);
        assert!(Cursor::at(&field, frame, 3, 0).is_err());
        assert!(Cursor::at(&field, frame, 0, 2).is_err());
    }

    #[test]
    fn lateral_neighbours_skip_carved_cells() {
        let (field, frame) = carved_field();
        let c = Cursor::at(&field, frame, 1, 0).unwrap();
        assert_eq!(c.right(&field, frame).unwrap(), 3);
        assert_eq!(c.left(&field, frame).unwrap(), 0);
        let edge = Cursor::at(&field, frame, 0, 1).unwrap();
        assert!(edge.left(&field, frame).is_err());
        let last = Cursor::at(&field, frame, 2, 1).unwrap();
        assert!(last.right(&field, frame).is_err());
    }

    #[test]
    fn vertical_neighbours_follow_logical_columns() {
        let (field, frame) = carved_field();
        let c = Cursor::at(&field, frame, 1, 1).unwrap();
        assert_eq!(c.up(&field, frame).unwrap(), 1);
        assert!(c.down(&field, frame).is_err());
        let top = Cursor::at(&field, frame, 1, 0).unwrap();
        assert_eq!(top.down(&field, frame).unwrap(), 6);
        assert!(top.up(&field, frame).is_err());
    }

    #[test]
    fn level_one_sees_every_cell() {
        let (field, _) = carved_field();
        let frame = Frame {
            w: 4,
            h: 2,
            level: 1,
        };
        let mut c = Cursor::start(&field, frame);
        for want in 0..8 {
            assert_eq!(c.now, want);
            c.advance(&field, frame);
        }
    }
}
