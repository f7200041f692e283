// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Energy, cumulative path, and visibility map building
//!
//! Three maps drive the carve.  The energy map scores each pixel by
//! its local gradient, the min-path map accumulates the cheapest route
//! from the top row to each pixel, and the visibility map records the
//! level at which each pixel leaves the image.  After every removal
//! the first two are patched incrementally rather than rebuilt.

use log::debug;

use crate::cq;
use crate::cursor::{Cursor, Frame};
use crate::error::RasterError;
use crate::raster::Raster;

impl Raster {
    fn intensity(&self, idx: usize) -> f64 {
        self.field[idx].mean(self.bpp)
    }

    /// Gradient energy of the pixel under `c`, plus its bias.  The
    /// vertical neighbours are handed in by the caller, which keeps
    /// them in lockstep instead of paying an O(w) row scan per pixel.
    fn point_energy(
        &self,
        c: Cursor,
        above: Option<Cursor>,
        below: Option<Cursor>,
    ) -> Result<f64, RasterError> {
        let frame = self.frame();
        let here = self.intensity(c.now);
        let gx = if frame.w == 1 {
            0.0
        } else if c.x == 0 {
            self.intensity(c.right(&self.field, frame)?) - here
        } else if c.x + 1 == frame.w {
            here - self.intensity(c.left(&self.field, frame)?)
        } else {
            (self.intensity(c.right(&self.field, frame)?)
                - self.intensity(c.left(&self.field, frame)?))
                / 2.0
        };
        let gy = match (above, below) {
            (None, None) => 0.0,
            (None, Some(b)) => self.intensity(b.now) - here,
            (Some(a), None) => here - self.intensity(a.now),
            (Some(a), Some(b)) => (self.intensity(b.now) - self.intensity(a.now)) / 2.0,
        };
        Ok(self.gradient.evaluate(gx, gy) + self.field[c.now].bias)
    }

    /// Score every visible pixel.  Three cursors sweep the view
    /// together, one per row of the vertical stencil.
    pub(crate) fn build_energy_map(&mut self) -> Result<(), RasterError> {
        let frame = self.frame();
        let mut c = Cursor::start(&self.field, frame);
        let mut above = Cursor::start(&self.field, frame);
        let mut below = cq!(frame.h > 1, Cursor::at(&self.field, frame, 0, 1)?, c);
        loop {
            let over = cq!(c.y > 0, Some(above), None);
            let under = cq!(c.y + 1 < frame.h, Some(below), None);
            let e = self.point_energy(c, over, under)?;
            self.field[c.now].energy = e;
            if c.x + 1 == frame.w && c.y + 1 == frame.h {
                return Ok(());
            }
            let row = c.y;
            c.advance(&self.field, frame);
            below.advance(&self.field, frame);
            if row > 0 {
                above.advance(&self.field, frame);
            }
        }
    }

    fn refresh_energy_at(&mut self, x: u32, y: u32) -> Result<(), RasterError> {
        let frame = self.frame();
        let c = Cursor::at(&self.field, frame, x, y)?;
        let over = cq!(y > 0, Some(Cursor::at(&self.field, frame, x, y - 1)?), None);
        let under = cq!(
            y + 1 < frame.h,
            Some(Cursor::at(&self.field, frame, x, y + 1)?),
            None
        );
        let e = self.point_energy(c, over, under)?;
        self.field[c.now].energy = e;
        Ok(())
    }

    /// Re-score the pixels flanking the seam that was just removed.
    /// Only those pixels see a different neighbourhood, so the rest of
    /// the energy map is still exact.
    pub(crate) fn update_energy_map(&mut self) -> Result<(), RasterError> {
        debug_assert_eq!(self.vpath.len(), self.h as usize);
        for y in 0..self.h {
            let xs = self.vpath[y as usize].x;
            if xs > 0 {
                self.refresh_energy_at(xs - 1, y)?;
            }
            if xs < self.w {
                self.refresh_energy_at(xs, y)?;
            }
        }
        Ok(())
    }

    /// Minimum over the up to three visible predecessors of column `x`
    /// one row up.  `prev` sits on `(x, y - 1)`.  A tie keeps the
    /// straight step, then the right diagonal.
    fn cheapest_predecessor(
        &self,
        prev: Cursor,
        x: u32,
        frame: Frame,
    ) -> Result<(f64, usize, i8), RasterError> {
        debug_assert_eq!(prev.x, x);
        let mut best = self.field[prev.now].minpath;
        let mut parent = prev.now;
        let mut dx = 0i8;
        if x + 1 < frame.w {
            let idx = prev.right(&self.field, frame)?;
            if self.field[idx].minpath < best {
                best = self.field[idx].minpath;
                parent = idx;
                dx = 1;
            }
        }
        if x > 0 {
            let idx = prev.left(&self.field, frame)?;
            if self.field[idx].minpath < best {
                best = self.field[idx].minpath;
                parent = idx;
                dx = -1;
            }
        }
        Ok((best, parent, dx))
    }

    /// Full dynamic-programming sweep: row 0 takes its energy, every
    /// later pixel its energy plus the cheapest predecessor.
    pub(crate) fn build_minpath_map(&mut self) -> Result<(), RasterError> {
        let frame = self.frame();
        let mut c = Cursor::start(&self.field, frame);
        let mut above = Cursor::start(&self.field, frame);
        loop {
            if c.y == 0 {
                let cell = &mut self.field[c.now];
                cell.minpath = cell.energy;
                cell.parent = None;
                cell.parent_dx = 0;
            } else {
                let (m, parent, dx) = self.cheapest_predecessor(above, c.x, frame)?;
                let cell = &mut self.field[c.now];
                cell.minpath = cell.energy + m;
                cell.parent = Some(parent);
                cell.parent_dx = dx;
            }
            if c.x + 1 == frame.w && c.y + 1 == frame.h {
                return Ok(());
            }
            let row = c.y;
            c.advance(&self.field, frame);
            if row > 0 {
                above.advance(&self.field, frame);
            }
        }
    }

    /// Patch the min-path map after a removal.  A dirty band per row,
    /// seeded at the seam head, grows by one to each side per row for
    /// the diagonal reach and shrinks from either edge while the fresh
    /// value, parent, and offset all match what is already stored.
    /// The result is exactly what a full rebuild would produce.
    pub(crate) fn update_minpath_map(&mut self) -> Result<(), RasterError> {
        let frame = self.frame();
        debug_assert!(frame.w >= 2);
        debug_assert_eq!(self.vpath.len(), frame.h as usize);
        let xs0 = self.vpath[0].x;
        let mut xmin = xs0.saturating_sub(1);
        let mut xmax = cq!(xs0 + 1 <= frame.w - 1, xs0 + 1, frame.w - 1);
        let mut cur = Cursor::at(&self.field, frame, xmin, 0)?;
        for _ in xmin..=xmax {
            let cell = &mut self.field[cur.now];
            cell.minpath = cell.energy;
            cell.parent = None;
            cell.parent_dx = 0;
            cur.advance(&self.field, frame);
        }
        for y in 1..frame.h {
            let xs = self.vpath[y as usize].x;
            xmin = cq!(xmin > xs, xs, xmin);
            if xmax <= xs {
                xmax = cq!(xs <= frame.w - 1, xs, frame.w - 1);
            }
            xmin = xmin.saturating_sub(1);
            xmax = cq!(xmax + 1 <= frame.w - 1, xmax + 1, frame.w - 1);
            debug_assert!(xmin <= xmax);
            let mut prev = Cursor::at(&self.field, frame, xmin, y - 1)?;
            let mut cur = Cursor::at(&self.field, frame, xmin, y)?;
            let mut x = xmin;
            loop {
                let (m, parent, dx) = self.cheapest_predecessor(prev, x, frame)?;
                let cell = &self.field[cur.now];
                let fresh = cell.energy + m;
                if cell.minpath == fresh && cell.parent == Some(parent) && cell.parent_dx == dx {
                    if x == xmin && x < xs {
                        xmin += 1;
                    } else if x == xmax && x >= xs {
                        xmax = xmax.saturating_sub(1);
                    }
                } else {
                    let cell = &mut self.field[cur.now];
                    cell.minpath = fresh;
                    cell.parent = Some(parent);
                    cell.parent_dx = dx;
                }
                if x >= xmax {
                    break;
                }
                x += 1;
                prev.advance(&self.field, frame);
                cur.advance(&self.field, frame);
            }
        }
        Ok(())
    }

    /// Find the cheapest seam: the first minimum of the last row,
    /// then the recorded predecessors back up to row 0.  One anchor
    /// per row lands in `vpath`, top to bottom.
    pub(crate) fn trace_seam(&mut self) -> Result<(), RasterError> {
        let frame = self.frame();
        let mut c = Cursor::at(&self.field, frame, 0, frame.h - 1)?;
        let mut best = c;
        let mut least = self.field[c.now].minpath;
        for _ in 1..frame.w {
            c.advance(&self.field, frame);
            if self.field[c.now].minpath < least {
                least = self.field[c.now].minpath;
                best = c;
            }
        }
        self.vpath = vec![best; frame.h as usize];
        let mut walk = best;
        for y in (0..frame.h).rev() {
            self.vpath[y as usize] = walk;
            if y > 0 {
                let cell = &self.field[walk.now];
                let parent = cell.parent.ok_or(RasterError::Invariant(
                    "seam walk reached a pixel with no recorded predecessor",
                ))?;
                let dx = cell.parent_dx;
                debug_assert!(dx >= 0 || walk.x > 0);
                walk = Cursor {
                    now: parent,
                    x: cq!(dx < 0, walk.x - 1, walk.x + dx as u32),
                    y: y - 1,
                };
            }
        }
        Ok(())
    }

    /// Stamp the pixels of the traced seam with the current level.
    pub(crate) fn mark_seam(&mut self) {
        let marker = self.level;
        for anchor in &self.vpath {
            self.field[anchor.now].visibility = marker;
        }
    }

    /// Mark the single remaining column so a fully carved raster can
    /// still be switched back to any width.
    fn finish_visibility_map(&mut self) {
        debug_assert_eq!(self.w, 1);
        let frame = self.frame();
        let marker = self.field.width();
        let mut c = Cursor::start(&self.field, frame);
        for _ in 0..frame.h {
            self.field[c.now].visibility = marker;
            c.advance(&self.field, frame);
        }
    }

    /// Carve seams level by level until `depth` levels exist, then
    /// inflate the arena so the same generation also serves widths
    /// beyond the baseline.
    fn build_visibility_map(
        &mut self,
        depth: u32,
        progress: &mut dyn FnMut(f64),
    ) -> Result<(), RasterError> {
        let start = self.max_level;
        let total = depth - start;
        for l in start..depth {
            debug_assert_eq!(self.level, l + self.max_level - 1);
            if (l - start) % 10 == 0 {
                progress(f64::from(l - start) / f64::from(total));
            }
            self.trace_seam()?;
            self.mark_seam();
            self.level += 1;
            self.w -= 1;
            if self.w > 1 {
                if self.update_energy {
                    self.update_energy_map()?;
                }
                self.update_minpath_map()?;
            } else {
                self.finish_visibility_map();
            }
        }
        self.inflate(depth - 1)?;
        self.max_level = depth;
        self.set_width(self.w_start);
        progress(1.0);
        Ok(())
    }

    /// Make sure at least `depth` levels are built, resuming from
    /// whatever is there already.  The view is rewound to the deepest
    /// built width first so the maps describe the state being carved.
    pub(crate) fn ensure_depth(
        &mut self,
        depth: u32,
        progress: &mut dyn FnMut(f64),
    ) -> Result<(), RasterError> {
        if depth <= self.max_level {
            return Ok(());
        }
        debug_assert!(depth <= self.w_start);
        debug!(
            "deepening the visibility map from {} to {} levels",
            self.max_level, depth
        );
        self.set_width(self.w_start - self.max_level + 1);
        self.build_energy_map()?;
        self.build_minpath_map()?;
        self.build_visibility_map(depth, progress)
    }
}
