//! Parameter normalization.
//!
//! Turns caller options into [`NormalizedParams`]: every field present,
//! defaulted, and range-checked. Failures here are call-site defects and are
//! reported as [`WandError::InvalidOptions`], which the gate returns
//! synchronously.
//!
//! ## Defaulting rules
//!
//! | Field | Absent / `null` / `false` / `""` | Checked |
//! |---|---|---|
//! | `width`, `height` | `0` (derive from aspect ratio) | `>= 0` |
//! | `quality` | `0` (encoder default) | `0..=100` |
//! | `format` | keep source format | by the engine |
//! | `autocrop` | `false` | non-boolean truthy values become `true` |
//! | `maxDimension` | the gate's configured ceiling | `<= 0` also means "use the ceiling" |
//!
//! Numbers on the wire must be integral: `80.0` is `80`, but `80.9` or
//! `-0.5` fail to parse rather than being rounded into range.
//!
//! `quality: 0` is indistinguishable from "not specified". A caller cannot
//! ask for a literal quality of zero.

use crate::error::WandError;
use crate::imaging::{Quality, ResizeParams, RotateParams, ThumbnailParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide default ceiling for requested width and height.
pub const DEFAULT_MAX_DIMENSION: u32 = 16384;

/// The public operations that take an options set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Resize,
    Thumbnail,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Resize => f.write_str("resize"),
            Operation::Thumbnail => f.write_str("thumbnail"),
        }
    }
}

/// Caller-supplied options, before defaulting.
///
/// Deserializes from the loosely-typed wire form (camelCase keys, lenient
/// numbers, truthy `autocrop`); unrecognized keys are ignored. In Rust code,
/// build it with the chained setters:
///
/// ```
/// # use wandgate::ImageOptions;
/// let options = ImageOptions::new().width(320).quality(80).autocrop(true);
/// assert_eq!(options.width, Some(320));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageOptions {
    #[serde(deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub quality: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(deserialize_with = "lenient::truthy", skip_serializing_if = "Option::is_none")]
    pub autocrop: Option<bool>,
    #[serde(deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub max_dimension: Option<i64>,
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON wire form. A malformed document is an options defect.
    pub fn from_json(json: &str) -> Result<Self, WandError> {
        serde_json::from_str(json)
            .map_err(|e| WandError::InvalidOptions(format!("Invalid options: {e}")))
    }

    pub fn width(mut self, width: i64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: i64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn quality(mut self, quality: i64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn autocrop(mut self, autocrop: bool) -> Self {
        self.autocrop = Some(autocrop);
        self
    }

    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = Some(i64::from(max_dimension));
        self
    }

    /// True when no recognized key is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overlay every key set in `other` onto `self`.
    pub fn merge(mut self, other: ImageOptions) -> Self {
        self.width = other.width.or(self.width);
        self.height = other.height.or(self.height);
        self.quality = other.quality.or(self.quality);
        self.format = other.format.or(self.format);
        self.autocrop = other.autocrop.or(self.autocrop);
        self.max_dimension = other.max_dimension.or(self.max_dimension);
        self
    }
}

/// The canonical request after defaulting. Every field is in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedParams {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub format: Option<String>,
    pub autocrop: bool,
    /// Effective ceiling for this request.
    pub max_dimension: u32,
}

impl NormalizedParams {
    pub fn to_resize_params(&self) -> ResizeParams {
        ResizeParams {
            width: self.width,
            height: self.height,
            quality: self.quality,
            format: self.format.clone(),
            autocrop: self.autocrop,
        }
    }

    pub fn to_thumbnail_params(&self) -> ThumbnailParams {
        ThumbnailParams {
            width: self.width,
            height: self.height,
            quality: self.quality,
            autocrop: self.autocrop,
        }
    }
}

/// Fill in defaults and reject structurally invalid option sets.
///
/// `None` means the caller supplied no options at all; that is allowed for
/// thumbnails and rejected for resizes, as is an empty options set.
pub fn normalize(
    operation: Operation,
    options: Option<&ImageOptions>,
    default_max_dimension: u32,
) -> Result<NormalizedParams, WandError> {
    let empty = ImageOptions::default();
    let options = options.unwrap_or(&empty);

    if operation == Operation::Resize && options.is_empty() {
        return Err(WandError::InvalidOptions(
            "Invalid width/height/format/quality arguments: \
             must provide at least one of width, height, format, or quality"
                .into(),
        ));
    }

    let width = options.width.unwrap_or(0);
    let height = options.height.unwrap_or(0);
    if width < 0 || height < 0 {
        return Err(WandError::InvalidOptions(
            "Invalid width/height arguments".into(),
        ));
    }

    let quality = Quality::new(options.quality.unwrap_or(0)).ok_or_else(|| {
        WandError::InvalidOptions("Invalid quality parameter: must be between 0 and 100".into())
    })?;

    Ok(NormalizedParams {
        // Anything past u32 is far beyond any ceiling; saturate and let the
        // limit check reject it.
        width: u32::try_from(width).unwrap_or(u32::MAX),
        height: u32::try_from(height).unwrap_or(u32::MAX),
        quality,
        format: options.format.clone().filter(|f| !f.is_empty()),
        autocrop: options.autocrop.unwrap_or(false),
        max_dimension: options
            .max_dimension
            .filter(|m| *m > 0)
            .map(|m| u32::try_from(m).unwrap_or(u32::MAX))
            .unwrap_or(default_max_dimension),
    })
}

/// Validate a rotation request.
pub fn normalize_rotation(degrees: f64) -> Result<RotateParams, WandError> {
    if !degrees.is_finite() {
        return Err(WandError::InvalidOptions(
            "Invalid rotation: degrees must be a finite number".into(),
        ));
    }
    Ok(RotateParams { degrees })
}

/// Deserializers for the loosely-typed wire form.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    /// Integers, integral floats and numeric strings. `null`, `false` and
    /// `""` mean unset.
    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<Loose>::deserialize(deserializer)? {
            None | Some(Loose::Bool(false)) => Ok(None),
            Some(Loose::Int(n)) => Ok(Some(n)),
            Some(Loose::Float(f)) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i64)),
            Some(Loose::Float(f)) => Err(D::Error::custom(format!(
                "expected an integer, found {f}"
            ))),
            Some(Loose::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Loose::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected an integer, found \"{s}\""))),
            Some(_) => Err(D::Error::custom("expected an integer")),
        }
    }

    /// Booleans as-is; any other non-null value by truthiness.
    pub fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        Ok(Option::<Loose>::deserialize(deserializer)?.map(|value| match value {
            Loose::Bool(b) => b,
            Loose::Int(n) => n != 0,
            Loose::Float(f) => f != 0.0 && !f.is_nan(),
            Loose::Text(s) => !s.is_empty(),
        }))
    }
}
