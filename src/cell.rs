//! The per-pixel record.

/// Channel capacity of a cell, grayscale through RGBA.
pub const MAX_CHANNELS: usize = 4;

/// One pixel of a multisize raster: its channel data together with every
/// map the engine keeps about it.  Carving never moves a cell; it only
/// stamps a `visibility` level on it, which is what lets one build serve
/// a whole range of widths.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cell {
    /// Channel values normalized into `[0, 1]`; slots past the raster's
    /// channel count stay zero.
    pub channels: [f64; MAX_CHANNELS],
    /// Gradient energy, bias included, as of the last energy pass.
    pub energy: f64,
    /// Preserve/discard weighting folded in at setup.  Never touched by
    /// the carving machinery.
    pub bias: f64,
    /// Cheapest cumulative path cost ending here.
    pub minpath: f64,
    /// Arena index of the minimum predecessor one row up, if any.
    pub parent: Option<usize>,
    /// Logical x offset of that predecessor: -1, 0 or +1.
    pub parent_dx: i8,
    /// 0 while never removed; otherwise the level at which a seam claimed
    /// this cell (or a duplicate introduced it).
    pub visibility: u32,
}

impl Cell {
    /// Mean intensity over the leading `bpp` channels.
    pub fn mean(&self, bpp: usize) -> f64 {
        debug_assert!(bpp >= 1 && bpp <= MAX_CHANNELS);
        self.channels[..bpp].iter().sum::<f64>() / bpp as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_covers_only_the_active_channels() {
        let mut cell = Cell::default();
        cell.channels = [0.5, 1.0, 0.0, 0.75];
        assert_eq!(cell.mean(1), 0.5);
        assert_eq!(cell.mean(2), 0.75);
        assert_eq!(cell.mean(3), 0.5);
    }
}
