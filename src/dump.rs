/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Diagnostic renders of the two working maps.  Neither touches the
//! raster; both plot whatever the last resize left behind.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::cq;
use crate::cursor::{Cursor, Frame};
use crate::raster::Raster;

impl Raster {
    /// Plot the energy of every pixel in the current view, scaled so
    /// the hottest pixel is white.  Negative energies (a discard mask
    /// at work) floor to black.
    pub fn energy_to_image(&self) -> GrayImage {
        let frame = self.frame();
        let mut c = Cursor::start(&self.field, frame);
        let mut samples = Vec::with_capacity(frame.w as usize * frame.h as usize);
        let mut peak = 0.0_f64;
        for _ in 0..frame.w as u64 * frame.h as u64 {
            let e = self.field[c.now].energy;
            peak = peak.max(e);
            samples.push((c.x, c.y, e));
            c.advance(&self.field, frame);
        }
        let scale = cq!(peak > 0.0, 255.0 / peak, 0.0);
        let mut out = GrayImage::new(self.width(), self.height());
        for (x, y, e) in samples {
            let v = (e * scale).max(0.0).min(255.0).round() as u8;
            let px = Luma([v]);
            cq!(
                self.transposed,
                out.put_pixel(y, x, px),
                out.put_pixel(x, y, px)
            );
        }
        out
    }

    /// Plot every seam recorded in the visibility store, over the
    /// image at its base width.  Pixels that never joined a seam stay
    /// black; seam pixels fade from yellow (carved first) to blue
    /// (carved last).
    pub fn seams_to_image(&self) -> RgbImage {
        let frame = Frame {
            w: self.w_start,
            h: self.h,
            level: self.max_level,
        };
        let (ow, oh) = cq!(self.transposed, (frame.h, frame.w), (frame.w, frame.h));
        let mut out = RgbImage::new(ow, oh);
        let depth = f64::from(self.max_level);
        let mut c = Cursor::start(&self.field, frame);
        for _ in 0..frame.w as u64 * frame.h as u64 {
            let vs = self.field[c.now].visibility;
            let px = if vs == 0 {
                Rgb([0, 0, 0])
            } else {
                let t = (f64::from(vs - self.max_level + 1) / depth).min(1.0);
                let cold = (255.0 * t).round() as u8;
                let warm = 255 - cold;
                Rgb([warm, warm, cold])
            };
            cq!(
                self.transposed,
                out.put_pixel(c.y, c.x, px),
                out.put_pixel(c.x, c.y, px)
            );
            c.advance(&self.field, frame);
        }
        out
    }
}
