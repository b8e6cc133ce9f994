//! Pure calculation functions for output geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// What the engine does to the decoded pixels before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Nothing requested: re-encode at the source size.
    Keep,
    /// Scale to exactly `width` x `height`. Stretches when both were requested.
    Scale { width: u32, height: u32 },
    /// Scale to cover the box keeping aspect ratio, then crop the centered
    /// `width` x `height` region.
    Fill {
        scale_width: u32,
        scale_height: u32,
        crop_x: u32,
        crop_y: u32,
        width: u32,
        height: u32,
    },
}

impl Geometry {
    /// Final output size for a source of the given dimensions.
    pub fn output_size(&self, source: (u32, u32)) -> (u32, u32) {
        match *self {
            Geometry::Keep => source,
            Geometry::Scale { width, height } | Geometry::Fill { width, height, .. } => {
                (width, height)
            }
        }
    }

    /// Size of the intermediate resample, if any. For `Fill` this is the
    /// covering size before the crop, which can be far larger than the
    /// output when the aspect ratios differ.
    pub fn resample_size(&self) -> Option<(u32, u32)> {
        match *self {
            Geometry::Keep => None,
            Geometry::Scale { width, height } => Some((width, height)),
            Geometry::Fill {
                scale_width,
                scale_height,
                ..
            } => Some((scale_width, scale_height)),
        }
    }
}

/// Decide the geometry for a request.
///
/// A zero in `target` means "not requested". With `autocrop`, one missing
/// side copies the other (a square box) and the image is filled then
/// center-cropped; both missing disables autocrop. Without `autocrop`, one
/// missing side is derived from the source aspect ratio.
///
/// # Examples
/// ```
/// # use wandgate::imaging::calculations::{plan_geometry, Geometry};
/// // 800x600 source, width only → height follows the 4:3 aspect
/// assert_eq!(
///     plan_geometry((800, 600), (400, 0), false),
///     Geometry::Scale { width: 400, height: 300 }
/// );
/// ```
pub fn plan_geometry(source: (u32, u32), target: (u32, u32), autocrop: bool) -> Geometry {
    let (width, height) = target;

    if width == 0 && height == 0 {
        return Geometry::Keep;
    }

    if autocrop {
        let side = width.max(height);
        let (width, height) = match (width, height) {
            (0, _) | (_, 0) => (side, side),
            both => both,
        };
        let (scale_width, scale_height) = calculate_fill_dimensions(source, (width, height));
        return Geometry::Fill {
            scale_width,
            scale_height,
            crop_x: (scale_width - width) / 2,
            crop_y: (scale_height - height) / 2,
            width,
            height,
        };
    }

    let (width, height) = derive_missing_dimension(source, target);
    Geometry::Scale { width, height }
}

/// Fill in a zero width or height from the source aspect ratio.
///
/// Derived sides are never smaller than one pixel.
pub fn derive_missing_dimension(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let aspect = src_w as f64 / src_h as f64;

    match target {
        (0, h) => (((h as f64 * aspect).round() as u32).max(1), h),
        (w, 0) => (w, ((w as f64 / aspect).round() as u32).max(1)),
        both => both,
    }
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may
/// exceed but never falls short.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(tgt_h))
    }
}

/// Number of clockwise quarter turns for `degrees`, if it is a right angle.
pub fn quarter_turns(degrees: f64) -> Option<u8> {
    let normalized = degrees.rem_euclid(360.0);
    let turns = normalized / 90.0;
    if turns.fract() != 0.0 {
        return None;
    }
    Some(turns as u8 % 4)
}
