// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gradient norms for the energy function.
//!
//! The engine reduces every pixel to its mean channel intensity and takes
//! centered differences `gx` and `gy` against the visible neighbors.  How
//! those two numbers collapse into one energy is a matter of taste, so it
//! is a plain enum the caller picks when the raster is built.

use std::str::FromStr;

/// The available gradient norms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    /// Euclidean norm of the gradient.
    Norm,
    /// Euclidean norm with the vertical component damped to a tenth.
    NormBias,
    /// Half the sum of the absolute components.  The default.
    SumAbs,
    /// The absolute horizontal component alone.
    XAbs,
    /// The absolute vertical component alone.
    YAbs,
}

impl GradientKind {
    /// Every name `from_str` accepts, for command-line listings.
    pub const NAMES: [&'static str; 5] = ["norm", "norm-bias", "sumabs", "xabs", "yabs"];

    pub fn evaluate(self, gx: f64, gy: f64) -> f64 {
        match self {
            GradientKind::Norm => (gx * gx + gy * gy).sqrt(),
            GradientKind::NormBias => (gx * gx + 0.1 * gy * gy).sqrt(),
            GradientKind::SumAbs => (gx.abs() + gy.abs()) / 2.0,
            GradientKind::XAbs => gx.abs(),
            GradientKind::YAbs => gy.abs(),
        }
    }
}

impl Default for GradientKind {
    fn default() -> GradientKind {
        GradientKind::SumAbs
    }
}

impl FromStr for GradientKind {
    type Err = String;

    fn from_str(name: &str) -> Result<GradientKind, String> {
        match name {
            "norm" => Ok(GradientKind::Norm),
            "norm-bias" => Ok(GradientKind::NormBias),
            "sumabs" => Ok(GradientKind::SumAbs),
            "xabs" => Ok(GradientKind::XAbs),
            "yabs" => Ok(GradientKind::YAbs),
            _ => Err(format!("unknown gradient function {:?}", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_every_norm() {
        assert_eq!(GradientKind::Norm.evaluate(3.0, 4.0), 5.0);
        assert_eq!(GradientKind::NormBias.evaluate(3.0, 0.0), 3.0);
        assert!((GradientKind::NormBias.evaluate(0.0, 1.0) - 0.1f64.sqrt()).abs() < 1e-12);
        assert_eq!(GradientKind::SumAbs.evaluate(3.0, -4.0), 3.5);
        assert_eq!(GradientKind::XAbs.evaluate(-3.0, 4.0), 3.0);
        assert_eq!(GradientKind::YAbs.evaluate(3.0, -4.0), 4.0);
    }

    #[test]
    fn parses_every_name() {
        for name in &GradientKind::NAMES {
            assert!(name.parse::<GradientKind>().is_ok());
        }
        assert_eq!("sumabs".parse::<GradientKind>(), Ok(GradientKind::SumAbs));
        assert!("sobel".parse::<GradientKind>().is_err());
    }

    #[test]
    fn default_is_sum_of_absolutes() {
        assert_eq!(GradientKind::default(), GradientKind::SumAbs);
    }
}
