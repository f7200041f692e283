// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The multisize raster
//!
//! A raster owns one arena of pixel cells and a visibility marker per
//! cell.  Carving never deletes anything: removing a seam stamps its
//! cells with the level at which they disappear, so one build serves a
//! whole range of widths, switching between them is O(1), and widening
//! past the original duplicates the cheapest seams back in.  Height
//! work rides on the same machinery through a transposition.

use log::{debug, info};

use itertools::iproduct;

use crate::cell::Cell;
use crate::cq;
use crate::cursor::{Cursor, Frame};
use crate::error::RasterError;
use crate::field::PixelField;
use crate::gradient::GradientKind;

/// Knobs fixed at ingestion time.  `update_energy` trades accuracy for
/// speed: with it set, the energy of the pixels flanking a removed
/// seam is recomputed before the next seam is searched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarveSettings {
    pub gradient: GradientKind,
    pub update_energy: bool,
}

/// A resizable image.  `w` and `h` are the logical dimensions of the
/// current view; the arena keeps every pixel ever seen at its storage
/// width.  `level + w - 1` always equals the storage width, `w_start`
/// and `h_start` are the dimensions the current generation of maps was
/// built from, and `max_level` is the deepest level built so far.
#[derive(Debug, Clone)]
pub struct Raster {
    pub(crate) field: PixelField,
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) w_start: u32,
    pub(crate) h_start: u32,
    pub(crate) level: u32,
    pub(crate) max_level: u32,
    pub(crate) bpp: usize,
    pub(crate) transposed: bool,
    pub(crate) gradient: GradientKind,
    pub(crate) update_energy: bool,
    pub(crate) vpath: Vec<Cursor>,
}

impl Raster {
    pub(crate) fn with_field(field: PixelField, bpp: usize, settings: CarveSettings) -> Raster {
        let w = field.width();
        let h = field.height();
        Raster {
            field,
            w,
            h,
            w_start: w,
            h_start: h,
            level: 1,
            max_level: 1,
            bpp,
            transposed: false,
            gradient: settings.gradient,
            update_energy: settings.update_energy,
            vpath: Vec::new(),
        }
    }

    pub(crate) fn frame(&self) -> Frame {
        Frame {
            w: self.w,
            h: self.h,
            level: self.level,
        }
    }

    /// Logical width in image space, whatever the storage orientation.
    pub fn width(&self) -> u32 {
        cq!(self.transposed, self.h, self.w)
    }

    /// Logical height in image space.
    pub fn height(&self) -> u32 {
        cq!(self.transposed, self.w, self.h)
    }

    /// Channels per pixel carried through the resize.
    pub fn channel_count(&self) -> usize {
        self.bpp
    }

    /// O(1) width switch inside the already-built range.
    pub(crate) fn set_width(&mut self, w1: u32) {
        debug_assert!(w1 <= self.field.width());
        debug_assert!(w1 + self.max_level >= self.w_start + 1);
        self.level = self.field.width() - w1 + 1;
        self.w = w1;
    }

    /// Rebuild the arena wide enough to hold the enlargement range of
    /// the generation just carved, through level `l`.  Every seam of
    /// this generation gets a duplicate inserted before it, blended
    /// with the pixel to its left; every older marker shifts up so the
    /// whole marker set stays one-per-width.  Backpointers do not
    /// survive the reallocation.
    pub(crate) fn inflate(&mut self, l: u32) -> Result<(), RasterError> {
        debug_assert!(l >= self.max_level);
        let w0 = self.field.width();
        let w1 = w0 + (l - self.max_level) + 1;
        debug!("inflating the arena from width {} to {}", w0, w1);
        let mut out = PixelField::new(w1, self.h)?;
        let lo = 2 * self.max_level - 1;
        let hi = l + self.max_level - 1;
        let mut dst = 0;
        for idx in 0..self.field.len() {
            let cell = self.field[idx];
            let vs = cell.visibility;
            if vs >= lo && vs <= hi {
                let mut dup = cell;
                dup.visibility = l + self.max_level - vs;
                dup.parent = None;
                dup.parent_dx = 0;
                if idx % w0 as usize > 0 {
                    let left = &self.field[idx - 1];
                    for k in 0..self.bpp {
                        dup.channels[k] = (cell.channels[k] + left.channels[k]) / 2.0;
                    }
                }
                out[dst] = dup;
                dst += 1;
            }
            let mut moved = cell;
            moved.parent = None;
            moved.parent_dx = 0;
            if vs != 0 {
                moved.visibility = vs + (l - self.max_level) + 1;
            }
            out[dst] = moved;
            dst += 1;
        }
        debug_assert_eq!(dst, out.len());
        self.field = out;
        self.level = l + 1;
        self.w = self.w_start;
        self.vpath.clear();
        Ok(())
    }

    /// Rebuild the arena from the visible pixels only.  Carving state
    /// is gone afterwards; bias survives, and the current view becomes
    /// the new generation baseline.
    pub(crate) fn flatten(&mut self) -> Result<(), RasterError> {
        debug!("flattening to the visible {}x{}", self.w, self.h);
        let mut out = PixelField::new(self.w, self.h)?;
        let frame = self.frame();
        let mut c = Cursor::start(&self.field, frame);
        for dst in 0..out.len() {
            let cell = self.field[c.now];
            out[dst] = Cell {
                channels: cell.channels,
                bias: cell.bias,
                ..Cell::default()
            };
            c.advance(&self.field, frame);
        }
        self.field = out;
        self.w_start = self.w;
        self.h_start = self.h;
        self.level = 1;
        self.max_level = 1;
        self.vpath.clear();
        Ok(())
    }

    /// Turn the storage on its side so the height can be carved by the
    /// width machinery.  Flattens first when carved, so maps and
    /// invisible pixels are lost either way.
    pub(crate) fn transpose(&mut self) -> Result<(), RasterError> {
        if self.level > 1 {
            self.flatten()?;
        }
        debug_assert_eq!(self.w, self.field.width());
        let w0 = self.field.width();
        let h0 = self.field.height();
        debug!("transposing {}x{} storage", w0, h0);
        let mut out = PixelField::new(h0, w0)?;
        for (x, y) in iproduct!(0..w0, 0..h0) {
            let src = self.field[(x, y)];
            out[(y, x)] = Cell {
                channels: src.channels,
                bias: src.bias,
                ..Cell::default()
            };
        }
        self.field = out;
        self.w = h0;
        self.h = w0;
        self.w_start = h0;
        self.h_start = w0;
        self.level = 1;
        self.max_level = 1;
        self.transposed = !self.transposed;
        self.vpath.clear();
        Ok(())
    }

    /// Resize to `width` x `height` in image space.
    ///
    /// Both targets are checked up front against `[1, 2b - 1]` where
    /// `b` is the axis baseline, so a bad call leaves the raster
    /// untouched.  Each axis reuses whatever depth is already built
    /// and only carves the missing levels; switching back to an
    /// already-built size costs nothing.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RasterError> {
        self.resize_with_progress(width, height, &mut |_| {})
    }

    /// `resize`, reporting build progress as fractions in `[0, 1]` to
    /// the supplied observer.
    pub fn resize_with_progress(
        &mut self,
        width: u32,
        height: u32,
        progress: &mut dyn FnMut(f64),
    ) -> Result<(), RasterError> {
        let w_base = cq!(self.transposed, self.h_start, self.w_start);
        let h_base = cq!(self.transposed, self.w_start, self.h_start);
        let max_width = w_base.saturating_mul(2) - 1;
        let max_height = h_base.saturating_mul(2) - 1;
        if width == 0 || height == 0 || width > max_width || height > max_height {
            return Err(RasterError::TargetOutOfRange {
                width,
                height,
                max_width,
                max_height,
            });
        }
        if width != self.width() {
            info!("carving the width from {} to {}", self.width(), width);
            if self.transposed {
                self.transpose()?;
            }
            let delta = cq!(width > self.w_start, width - self.w_start, self.w_start - width);
            self.ensure_depth(delta + 1, progress)?;
            self.set_width(width);
        }
        if height != self.height() {
            info!("carving the height from {} to {}", self.height(), height);
            if !self.transposed {
                self.transpose()?;
            }
            let delta = cq!(
                height > self.w_start,
                height - self.w_start,
                self.w_start - height
            );
            self.ensure_depth(delta + 1, progress)?;
            self.set_width(height);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    // One flat column (x = 2) between two contrasty ones.  Every row
    // is the same, so the cheapest seam is the whole flat column.
    const STRIPE: [u8; 4] = [0, 100, 50, 100];

    fn stripe() -> GrayImage {
        GrayImage::from_fn(4, 3, |x, _| Luma([STRIPE[x as usize]]))
    }

    fn noise(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([((x * 37 + y * 101) % 251) as u8]))
    }

    fn row(img: &GrayImage, y: u32) -> Vec<u8> {
        (0..img.width()).map(|x| img.get_pixel(x, y).0[0]).collect()
    }

    #[test]
    fn shrinking_drops_the_flattest_column() {
        let mut r = Raster::from_image(&stripe(), CarveSettings::default()).unwrap();
        r.resize(3, 3).unwrap();
        assert_eq!((r.width(), r.height()), (3, 3));
        let out: GrayImage = r.to_image();
        for y in 0..3 {
            assert_eq!(row(&out, y), vec![0, 100, 100]);
        }
    }

    #[test]
    fn enlarging_blends_a_duplicate_in_front_of_the_seam() {
        let mut r = Raster::from_image(&stripe(), CarveSettings::default()).unwrap();
        r.resize(5, 3).unwrap();
        assert_eq!((r.width(), r.height()), (5, 3));
        let out: GrayImage = r.to_image();
        for y in 0..3 {
            assert_eq!(row(&out, y), vec![0, 100, 75, 50, 100]);
        }
    }

    #[test]
    fn resizing_back_restores_the_original_exactly() {
        let img = stripe();
        let mut shrunk = Raster::from_image(&img, CarveSettings::default()).unwrap();
        shrunk.resize(3, 3).unwrap();
        shrunk.resize(4, 3).unwrap();
        let back: GrayImage = shrunk.to_image();
        assert_eq!(back.into_raw(), img.clone().into_raw());

        let mut grown = Raster::from_image(&img, CarveSettings::default()).unwrap();
        grown.resize(5, 3).unwrap();
        grown.resize(4, 3).unwrap();
        let back: GrayImage = grown.to_image();
        assert_eq!(back.into_raw(), img.into_raw());
    }

    #[test]
    fn stepwise_and_direct_carving_agree() {
        let _ = env_logger::builder().is_test(true).try_init();
        let settings = CarveSettings {
            update_energy: true,
            ..CarveSettings::default()
        };
        let img = noise(8, 5);
        let mut direct = Raster::from_image(&img, settings).unwrap();
        let mut stepped = Raster::from_image(&img, settings).unwrap();
        direct.resize(5, 5).unwrap();
        for w in &[7, 6, 5] {
            stepped.resize(*w, 5).unwrap();
        }
        let a: GrayImage = direct.to_image();
        let b: GrayImage = stepped.to_image();
        assert_eq!(a.into_raw(), b.into_raw());
    }

    #[test]
    fn both_axes_carve_through_a_transpose() {
        let mut r = Raster::from_image(&noise(6, 5), CarveSettings::default()).unwrap();
        r.resize(4, 3).unwrap();
        assert_eq!((r.width(), r.height()), (4, 3));
        assert!(r.transposed);
        let out: GrayImage = r.to_image();
        assert_eq!(out.dimensions(), (4, 3));
    }

    #[test]
    fn constant_color_survives_any_resize() {
        let img = RgbImage::from_pixel(9, 7, Rgb([12, 200, 57]));
        let mut r = Raster::from_image(&img, CarveSettings::default()).unwrap();
        r.resize(11, 5).unwrap();
        let out: RgbImage = r.to_image();
        assert_eq!(out.dimensions(), (11, 5));
        assert!(out.pixels().all(|p| p.0 == [12, 200, 57]));
    }

    #[test]
    fn degenerate_axes_resize_the_other_way() {
        let tall = GrayImage::from_fn(1, 5, |_, y| Luma([(y * 60) as u8]));
        let mut r = Raster::from_image(&tall, CarveSettings::default()).unwrap();
        r.resize(1, 3).unwrap();
        let out: GrayImage = r.to_image();
        assert_eq!(out.dimensions(), (1, 3));
        assert_eq!(
            (0..3).map(|y| out.get_pixel(0, y).0[0]).collect::<Vec<_>>(),
            vec![120, 180, 240]
        );

        let wide = GrayImage::from_fn(5, 1, |x, _| Luma([(x * 60) as u8]));
        let mut r = Raster::from_image(&wide, CarveSettings::default()).unwrap();
        r.resize(3, 1).unwrap();
        let out: GrayImage = r.to_image();
        assert_eq!(out.dimensions(), (3, 1));
        assert_eq!(row(&out, 0), vec![120, 180, 240]);
    }

    #[test]
    fn bad_targets_leave_the_raster_alone() {
        let mut r = Raster::from_image(&stripe(), CarveSettings::default()).unwrap();
        assert!(r.resize(0, 3).is_err());
        assert!(r.resize(8, 3).is_err());
        assert!(r.resize(4, 6).is_err());
        assert_eq!((r.width(), r.height()), (4, 3));
        assert_eq!(r.max_level, 1);
        // The edge of the legal range still works, all the way down
        // to a single surviving column.
        r.resize(7, 3).unwrap();
        assert_eq!(r.width(), 7);
    }

    #[test]
    fn repeated_resizes_reuse_the_built_maps() {
        let mut r = Raster::from_image(&stripe(), CarveSettings::default()).unwrap();
        r.resize(3, 3).unwrap();
        let shape = (r.field.len(), r.max_level);
        r.resize(3, 3).unwrap();
        assert_eq!((r.field.len(), r.max_level), shape);
        r.resize(4, 3).unwrap();
        assert_eq!((r.field.len(), r.max_level), shape);
        assert_eq!((r.width(), r.height()), (4, 3));
    }

    #[test]
    fn progress_reports_cover_the_build() {
        let mut r = Raster::from_image(&noise(24, 2), CarveSettings::default()).unwrap();
        let mut seen = Vec::new();
        r.resize_with_progress(10, 2, &mut |f| seen.push(f)).unwrap();
        assert_eq!(seen.first(), Some(&0.0));
        assert_eq!(seen.last(), Some(&1.0));
        assert!(seen.windows(2).all(|p| p[0] <= p[1]));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn every_width_switch_keeps_the_arena_invariant() {
        let mut r = Raster::from_image(&stripe(), CarveSettings::default()).unwrap();
        r.resize(3, 3).unwrap();
        for w in 3..=r.field.width() {
            r.set_width(w);
            assert_eq!(r.level + r.w - 1, r.field.width());
        }
    }
}
