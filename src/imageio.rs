// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Crossing the `image` boundary
//!
//! Everything inside the engine is `f64` in `[0, 1]`; these are the
//! only places a host image is read or written.  Ingestion normalizes
//! by the subpixel maximum, write-back denormalizes with clamping.

use image::{GenericImageView, ImageBuffer, Pixel, Primitive};
use num_traits::NumCast;

use crate::cell::MAX_CHANNELS;
use crate::cq;
use crate::cursor::Cursor;
use crate::error::RasterError;
use crate::field::PixelField;
use crate::raster::{CarveSettings, Raster};

fn to_float<S: NumCast>(s: S) -> f64 {
    NumCast::from(s).unwrap()
}

fn subpixel_peak<S: Primitive>() -> f64 {
    to_float(S::max_value())
}

fn denormalize<S: NumCast>(v: f64, peak: f64) -> S {
    let v = cq!(v < 0.0, 0.0, cq!(v > 1.0, 1.0, v));
    NumCast::from((v * peak).round()).unwrap()
}

impl Raster {
    /// Load a raster from anything `image` can view.  Subpixels land
    /// in `[0, 1]`, the channel count is fixed from the pixel type,
    /// and alpha is carved along with the colors.
    pub fn from_image<I, P, S>(view: &I, settings: CarveSettings) -> Result<Raster, RasterError>
    where
        I: GenericImageView<Pixel = P>,
        P: Pixel<Subpixel = S> + 'static,
        S: Primitive + 'static,
    {
        let (w, h) = view.dimensions();
        if w == 0 || h == 0 {
            return Err(RasterError::EmptyImage {
                width: w,
                height: h,
            });
        }
        let bpp = P::channel_count() as usize;
        if bpp > MAX_CHANNELS {
            return Err(RasterError::ChannelCount {
                got: P::channel_count(),
            });
        }
        let mut field = PixelField::new(w, h)?;
        let peak = subpixel_peak::<S>();
        for (x, y, pixel) in view.pixels() {
            let cell = &mut field[(x, y)];
            for (k, sub) in pixel.channels().iter().enumerate() {
                cell.channels[k] = to_float(*sub) / peak;
            }
        }
        Ok(Raster::with_field(field, bpp, settings))
    }

    /// Fold a mask into the per-pixel bias: every mask pixel that
    /// lands inside the raster adds `weight` scaled by its average
    /// intensity.  Positive weight protects pixels, negative weight
    /// offers them up.  Apply masks before the first resize; the
    /// offset is in the raster's storage orientation.
    pub fn add_bias<I, P, S>(
        &mut self,
        layer: &I,
        offset: (i64, i64),
        weight: f64,
    ) -> Result<(), RasterError>
    where
        I: GenericImageView<Pixel = P>,
        P: Pixel<Subpixel = S> + 'static,
        S: Primitive + 'static,
    {
        let lbpp = P::channel_count() as usize;
        let peak = subpixel_peak::<S>();
        let w = <i64 as From<u32>>::from(self.field.width());
        let h = <i64 as From<u32>>::from(self.field.height());
        for (x, y, pixel) in layer.pixels() {
            let fx = offset.0 + <i64 as From<u32>>::from(x);
            let fy = offset.1 + <i64 as From<u32>>::from(y);
            if fx < 0 || fy < 0 || fx >= w || fy >= h {
                continue;
            }
            let sum: f64 = pixel.channels().iter().map(|s| to_float(*s)).sum();
            self.field[(fx as u32, fy as u32)].bias += weight * sum / (peak * lbpp as f64);
        }
        Ok(())
    }

    /// Materialize the visible pixels as a fresh image, in image-space
    /// orientation whatever the storage looks like.  Channels beyond
    /// the carved count come out zero.
    pub fn to_image<P, S>(&self) -> ImageBuffer<P, Vec<S>>
    where
        P: Pixel<Subpixel = S> + 'static,
        S: Primitive + 'static,
    {
        let mut out = ImageBuffer::new(self.width(), self.height());
        let peak = subpixel_peak::<S>();
        let frame = self.frame();
        let mut c = Cursor::start(&self.field, frame);
        for _ in 0..frame.w as u64 * frame.h as u64 {
            let cell = &self.field[c.now];
            let px = P::from_channels(
                denormalize(cell.channels[0], peak),
                denormalize(cell.channels[1], peak),
                denormalize(cell.channels[2], peak),
                denormalize(cell.channels[3], peak),
            );
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
