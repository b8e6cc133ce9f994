//! Parameter types for engine operations.
//!
//! These structs describe *what* the engine should do. They are built by the
//! gate from fully-validated options, so every value here is already in
//! range; engines do not re-check them.
//!
//! ## Types
//!
//! - [`Quality`]: Encoder quality, 0–100. `0` means "encoder default".
//! - [`ResizeParams`]: Target box, quality, output format, autocrop.
//! - [`ThumbnailParams`]: Same as resize minus the format (thumbnails keep the source format).
//! - [`RotateParams`]: Clockwise rotation in degrees.

/// Encoder quality (0-100). Zero is a sentinel for "let the encoder decide".
///
/// A caller cannot request a literal quality of 0: the options layer treats
/// an explicit `0` exactly like an absent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quality(u8);

impl Quality {
    /// Returns `None` outside 0-100.
    pub fn new(value: i64) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_engine_default(self) -> bool {
        self.0 == 0
    }
}

/// Parameters for a resize. A zero width or height means "derive from the
/// aspect ratio".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    /// Output encoding by extension (`png`, `jpg`, ...). `None` keeps the source format.
    pub format: Option<String>,
    pub autocrop: bool,
}

/// Parameters for a thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailParams {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub autocrop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateParams {
    /// Clockwise.
    pub degrees: f64,
}
