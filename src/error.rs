use failure::Fail;

/// Everything the engine can report.  Coordinate and boundary variants are
/// contract violations a correct caller never sees; the allocation and
/// invariant variants are the ones production code should be prepared to
/// match on.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum RasterError {
    #[fail(display = "cannot allocate a {}x{} pixel arena", width, height)]
    Allocation { width: u32, height: u32 },

    #[fail(display = "coordinates ({}, {}) outside the {}x{} grid", x, y, w, h)]
    OutOfRange { x: u32, y: u32, w: u32, h: u32 },

    #[fail(display = "neighbor access across the boundary at ({}, {})", x, y)]
    Boundary { x: u32, y: u32 },

    #[fail(display = "internal bookkeeping out of joint: {}", _0)]
    Invariant(&'static str),

    #[fail(
        display = "resize target {}x{} outside the supported range 1x1..={}x{}",
        width, height, max_width, max_height
    )]
    TargetOutOfRange {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[fail(display = "{} channels per pixel, at most 4 supported", got)]
    ChannelCount { got: u8 },

    #[fail(display = "refusing a {}x{} image", width, height)]
    EmptyImage { width: u32, height: u32 },
}
