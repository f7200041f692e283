// #![deny(missing_docs)]

extern crate image;

pub mod ternary;

pub mod cell;
pub use cell::Cell;

pub mod cursor;
pub use cursor::{Cursor, Frame};

pub mod error;
pub use error::RasterError;

pub mod field;
pub use field::PixelField;

pub mod gradient;
pub use gradient::GradientKind;

pub mod raster;
pub use raster::{CarveSettings, Raster};

mod dump;
mod imageio;
mod maps;
