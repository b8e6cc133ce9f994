//! Pure Rust engine on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Thumbnail | `DynamicImage::thumbnail_exact` (fast integer downscale) |
//! | Autocrop | fill-resize then `crop_imm` around the center |
//! | Rotate | `rotate90` / `rotate180` / `rotate270` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → AVIF | `AvifEncoder::new_with_speed_quality` (rav1e, speed 6) |
//! | Encode → others | `DynamicImage::write_to` |
//!
//! Error messages name files by base name only.

use super::calculations::{Geometry, plan_geometry, quarter_turns};
use super::engine::{EngineError, EngineInput, ImageEngine, ImageInfo, ImageOutput};
use super::params::{Quality, ResizeParams, RotateParams, ThumbnailParams};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Default JPEG quality when the caller leaves it to the engine.
const JPEG_DEFAULT_QUALITY: u8 = 85;
/// Default AVIF quality when the caller leaves it to the engine.
const AVIF_DEFAULT_QUALITY: u8 = 80;
const AVIF_SPEED: u8 = 6;
/// Largest intermediate resample, in pixels. The gate's ceiling bounds the
/// requested sides, not the side derived from a lopsided aspect ratio.
const MAX_RESAMPLE_PIXELS: u64 = 16384 * 16384;

/// Engine backed by the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEngine;

impl RustEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Which resampler a geometry change uses.
#[derive(Clone, Copy)]
enum Resampler {
    Lanczos,
    Thumbnail,
}

impl Resampler {
    fn apply(self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        match self {
            Resampler::Lanczos => img.resize_exact(width, height, FilterType::Lanczos3),
            Resampler::Thumbnail => img.thumbnail_exact(width, height),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Decode the input, returning the pixels and the detected source format.
fn load_image(input: &EngineInput) -> Result<(DynamicImage, ImageFormat), EngineError> {
    let (decoded, label) = match input {
        EngineInput::Path(path) => {
            let reader = ImageReader::open(path)?.with_guessed_format()?;
            (decode(reader), display_name(path))
        }
        EngineInput::Buffer(bytes) => {
            let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
            (decode(reader), "buffer".to_string())
        }
    };
    decoded.map_err(|e| EngineError::ProcessingFailed(format!("Failed to decode {label}: {e}")))
}

fn decode<R: std::io::BufRead + std::io::Seek>(
    reader: ImageReader<R>,
) -> Result<(DynamicImage, ImageFormat), String> {
    let format = reader
        .format()
        .ok_or_else(|| "unrecognized image format".to_string())?;
    let img = reader.decode().map_err(|e| e.to_string())?;
    Ok((img, format))
}

/// Reject a plan whose resample would not fit the pixel budget.
fn check_budget(geometry: &Geometry) -> Result<(), EngineError> {
    if let Some((width, height)) = geometry.resample_size() {
        let pixels = u64::from(width) * u64::from(height);
        if pixels > MAX_RESAMPLE_PIXELS {
            return Err(EngineError::ProcessingFailed(format!(
                "Planned resample of {width}x{height} exceeds the budget of {MAX_RESAMPLE_PIXELS} pixels"
            )));
        }
    }
    Ok(())
}

fn apply_geometry(img: DynamicImage, geometry: Geometry, resampler: Resampler) -> DynamicImage {
    match geometry {
        Geometry::Keep => img,
        Geometry::Scale { width, height } => resampler.apply(&img, width, height),
        Geometry::Fill {
            scale_width,
            scale_height,
            crop_x,
            crop_y,
            width,
            height,
        } => resampler
            .apply(&img, scale_width, scale_height)
            .crop_imm(crop_x, crop_y, width, height),
    }
}

/// Resolve a caller-supplied format name to an encodable format.
fn output_format(name: &str) -> Result<ImageFormat, EngineError> {
    ImageFormat::from_extension(name.to_ascii_lowercase())
        .filter(|f| f.writing_enabled())
        .ok_or_else(|| {
            EngineError::ProcessingFailed(format!("Unsupported output format: {name}"))
        })
}

fn format_name(format: ImageFormat) -> String {
    format!("{format:?}").to_ascii_lowercase()
}

/// Encode to an in-memory blob.
fn encode(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
) -> Result<Vec<u8>, EngineError> {
    let mut buf = Cursor::new(Vec::new());
    let failed = |e: image::ImageError| {
        EngineError::ProcessingFailed(format!("{} encode failed: {e}", format_name(format)))
    };

    match format {
        ImageFormat::Jpeg => {
            let q = if quality.is_engine_default() {
                JPEG_DEFAULT_QUALITY
            } else {
                quality.value()
            };
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q))
                .map_err(failed)?;
        }
        ImageFormat::Avif => {
            let q = if quality.is_engine_default() {
                AVIF_DEFAULT_QUALITY
            } else {
                quality.value()
            };
            img.write_with_encoder(AvifEncoder::new_with_speed_quality(&mut buf, AVIF_SPEED, q))
                .map_err(failed)?;
        }
        other => img.write_to(&mut buf, other).map_err(failed)?,
    }

    Ok(buf.into_inner())
}

fn finish(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
) -> Result<ImageOutput, EngineError> {
    let data = encode(img, format, quality)?;
    Ok(ImageOutput {
        data,
        info: ImageInfo {
            width: img.width(),
            height: img.height(),
            quality: (!quality.is_engine_default()).then(|| quality.value()),
            format: Some(format_name(format)),
        },
    })
}

impl ImageEngine for RustEngine {
    fn resize(
        &self,
        input: &EngineInput,
        params: &ResizeParams,
    ) -> Result<ImageOutput, EngineError> {
        let target_format = params.format.as_deref().map(output_format).transpose()?;
        let (img, source_format) = load_image(input)?;

        let geometry = plan_geometry(
            (img.width(), img.height()),
            (params.width, params.height),
            params.autocrop,
        );
        check_budget(&geometry)?;
        let resized = apply_geometry(img, geometry, Resampler::Lanczos);

        finish(
            &resized,
            target_format.unwrap_or(source_format),
            params.quality,
        )
    }

    fn thumbnail(
        &self,
        input: &EngineInput,
        params: &ThumbnailParams,
    ) -> Result<ImageOutput, EngineError> {
        let (img, source_format) = load_image(input)?;

        let geometry = plan_geometry(
            (img.width(), img.height()),
            (params.width, params.height),
            params.autocrop,
        );
        check_budget(&geometry)?;
        let thumb = apply_geometry(img, geometry, Resampler::Thumbnail);

        finish(&thumb, source_format, params.quality)
    }

    fn rotate(
        &self,
        input: &EngineInput,
        params: &RotateParams,
    ) -> Result<ImageOutput, EngineError> {
        let turns = quarter_turns(params.degrees).ok_or_else(|| {
            EngineError::ProcessingFailed(format!(
                "Unsupported rotation of {} degrees: use a multiple of 90",
                params.degrees
            ))
        })?;
        let (img, source_format) = load_image(input)?;

        let rotated = match turns {
            1 => img.rotate90(),
            2 => img.rotate180(),
            3 => img.rotate270(),
            _ => img,
        };

        finish(&rotated, source_format, Quality::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_jpeg, create_test_png, jpeg_bytes};

    fn resize_params(width: u32, height: u32) -> ResizeParams {
        ResizeParams {
            width,
            height,
            quality: Quality::default(),
            format: None,
            autocrop: false,
        }
    }

    fn thumb_params(width: u32, height: u32, autocrop: bool) -> ThumbnailParams {
        ThumbnailParams {
            width,
            height,
            quality: Quality::default(),
            autocrop,
        }
    }

    #[test]
    fn resize_synthetic_jpeg_exact() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = RustEngine::new()
            .resize(&EngineInput::Path(source), &resize_params(50, 50))
            .unwrap();

        assert_eq!((output.info.width, output.info.height), (50, 50));
        assert_eq!(output.info.format.as_deref(), Some("jpeg"));
        assert_eq!(&output.data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn resize_width_only_keeps_aspect() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = RustEngine::new()
            .resize(&EngineInput::Path(source), &resize_params(100, 0))
            .unwrap();

        assert_eq!((output.info.width, output.info.height), (100, 75));
    }

    #[test]
    fn resize_converts_to_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 120, 80);

        let output = RustEngine::new()
            .resize(
                &EngineInput::Path(source),
                &ResizeParams {
                    format: Some("PNG".into()),
                    ..resize_params(60, 40)
                },
            )
            .unwrap();

        assert_eq!(&output.data[..4], &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(output.info.format.as_deref(), Some("png"));
    }

    #[test]
    fn lopsided_aspect_is_refused_before_resampling() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("sliver.png");
        create_test_png(&source, 1, 100);
        let input = EngineInput::Path(source);

        let err = RustEngine::new()
            .resize(&input, &resize_params(16384, 0))
            .unwrap_err();
        assert!(err.to_string().contains("16384x1638400"), "{err}");

        let err = RustEngine::new()
            .thumbnail(&input, &thumb_params(16384, 1, true))
            .unwrap_err();
        assert!(err.to_string().contains("budget"), "{err}");
    }

    #[test]
    fn resize_unknown_format_errors_before_decoding() {
        let err = RustEngine::new()
            .resize(
                &EngineInput::Buffer(Vec::new()),
                &ResizeParams {
                    format: Some("xyz".into()),
                    ..resize_params(10, 10)
                },
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Processing failed: Unsupported output format: xyz"
        );
    }

    #[test]
    fn resize_reports_applied_quality() {
        let output = RustEngine::new()
            .resize(
                &EngineInput::Buffer(jpeg_bytes(64, 64)),
                &ResizeParams {
                    quality: Quality::new(40).unwrap(),
                    ..resize_params(32, 32)
                },
            )
            .unwrap();
        assert_eq!(output.info.quality, Some(40));
    }

    #[test]
    fn resize_autocrop_produces_exact_box() {
        let output = RustEngine::new()
            .resize(
                &EngineInput::Buffer(jpeg_bytes(300, 200)),
                &ResizeParams {
                    autocrop: true,
                    ..resize_params(100, 100)
                },
            )
            .unwrap();
        assert_eq!((output.info.width, output.info.height), (100, 100));
    }

    #[test]
    fn thumbnail_keeps_png_source_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_png(&source, 200, 100);

        let output = RustEngine::new()
            .thumbnail(&EngineInput::Path(source), &thumb_params(0, 50, false))
            .unwrap();

        assert_eq!((output.info.width, output.info.height), (100, 50));
        assert_eq!(output.info.format.as_deref(), Some("png"));
    }

    #[test]
    fn thumbnail_autocrop_single_side_is_square() {
        let output = RustEngine::new()
            .thumbnail(
                &EngineInput::Buffer(jpeg_bytes(160, 90)),
                &thumb_params(48, 0, true),
            )
            .unwrap();
        assert_eq!((output.info.width, output.info.height), (48, 48));
    }

    #[test]
    fn corrupt_buffer_is_a_processing_failure() {
        let err = RustEngine::new()
            .thumbnail(
                &EngineInput::Buffer(b"definitely not an image".to_vec()),
                &thumb_params(10, 10, false),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::ProcessingFailed(_)));
        assert!(err.to_string().contains("buffer"));
    }

    #[test]
    fn decode_error_names_file_not_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, [0xFF, 0xD8, 0xFF, 0x00, 0x01]).unwrap();

        let err = RustEngine::new()
            .resize(&EngineInput::Path(source), &resize_params(10, 10))
            .unwrap_err()
            .to_string();
        assert!(err.contains("broken.jpg"), "{err}");
        assert!(!err.contains(&tmp.path().display().to_string()), "{err}");
    }

    #[test]
    fn rotate_quarter_turn_swaps_dimensions() {
        let output = RustEngine::new()
            .rotate(
                &EngineInput::Buffer(jpeg_bytes(40, 20)),
                &RotateParams { degrees: 90.0 },
            )
            .unwrap();
        assert_eq!((output.info.width, output.info.height), (20, 40));
    }

    #[test]
    fn rotate_oblique_angle_fails() {
        let err = RustEngine::new()
            .rotate(
                &EngineInput::Buffer(jpeg_bytes(40, 20)),
                &RotateParams { degrees: 30.0 },
            )
            .unwrap_err();
        assert!(err.to_string().contains("multiple of 90"));
    }
}
