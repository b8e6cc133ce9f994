//! The engine seam.
//!
//! [`ImageEngine`] is the outbound contract the gate dispatches to: three
//! operations (resize, thumbnail, rotate), each taking a path or an
//! in-memory buffer and returning encoded bytes plus [`ImageInfo`].
//!
//! Engines receive only validated input. A path handed to an engine is
//! absolute, canonical, and known to be a readable regular file at the time
//! it was checked; parameters are range-checked. Engines are free to fail
//! (corrupt data, unsupported format) and report that through
//! [`EngineError`].
//!
//! The bundled implementation is [`RustEngine`](super::rust_engine::RustEngine).

use super::params::{ResizeParams, RotateParams, ThumbnailParams};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// What the engine reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineInput {
    /// A validated, canonical file path.
    Path(PathBuf),
    /// Caller bytes, passed through untouched.
    Buffer(Vec<u8>),
}

/// Describes the encoded result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Present only when a non-default quality was applied.
    pub quality: Option<u8>,
    /// Lowercase format name of the encoded bytes, e.g. `"jpeg"`.
    pub format: Option<String>,
}

/// A successful operation: encoded bytes and their description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    pub data: Vec<u8>,
    pub info: ImageInfo,
}

/// Trait for image engines.
///
/// Calls happen on worker threads, so engines must be `Send + Sync`.
pub trait ImageEngine: Send + Sync {
    /// Resize to the requested box, optionally converting format.
    fn resize(
        &self,
        input: &EngineInput,
        params: &ResizeParams,
    ) -> Result<ImageOutput, EngineError>;

    /// Fast downscale for previews. Keeps the source format.
    fn thumbnail(
        &self,
        input: &EngineInput,
        params: &ThumbnailParams,
    ) -> Result<ImageOutput, EngineError>;

    /// Rotate clockwise.
    fn rotate(
        &self,
        input: &EngineInput,
        params: &RotateParams,
    ) -> Result<ImageOutput, EngineError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::Quality;
    use std::sync::Mutex;

    /// Mock engine that records calls without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and can be called from rayon workers.
    #[derive(Default)]
    pub struct MockEngine {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// When set, every call fails with this message.
        pub failure: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Resize {
            input: EngineInput,
            width: u32,
            height: u32,
            quality: u8,
            format: Option<String>,
            autocrop: bool,
        },
        Thumbnail {
            input: EngineInput,
            width: u32,
            height: u32,
            quality: u8,
            autocrop: bool,
        },
        Rotate {
            input: EngineInput,
            degrees: f64,
        },
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(message: &str) -> Self {
            Self {
                operations: Mutex::new(Vec::new()),
                failure: Some(message.to_string()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn reply(
            &self,
            width: u32,
            height: u32,
            quality: Quality,
        ) -> Result<ImageOutput, EngineError> {
            if let Some(message) = &self.failure {
                return Err(EngineError::ProcessingFailed(message.clone()));
            }
            Ok(ImageOutput {
                data: vec![0xFF, 0xD8, 0xFF],
                info: ImageInfo {
                    width: width.max(1),
                    height: height.max(1),
                    quality: (!quality.is_engine_default()).then(|| quality.value()),
                    format: Some("jpeg".to_string()),
                },
            })
        }
    }

    impl ImageEngine for MockEngine {
        fn resize(
            &self,
            input: &EngineInput,
            params: &ResizeParams,
        ) -> Result<ImageOutput, EngineError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                input: input.clone(),
                width: params.width,
                height: params.height,
                quality: params.quality.value(),
                format: params.format.clone(),
                autocrop: params.autocrop,
            });
            self.reply(params.width, params.height, params.quality)
        }

        fn thumbnail(
            &self,
            input: &EngineInput,
            params: &ThumbnailParams,
        ) -> Result<ImageOutput, EngineError> {
            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                input: input.clone(),
                width: params.width,
                height: params.height,
                quality: params.quality.value(),
                autocrop: params.autocrop,
            });
            self.reply(params.width, params.height, params.quality)
        }

        fn rotate(
            &self,
            input: &EngineInput,
            params: &RotateParams,
        ) -> Result<ImageOutput, EngineError> {
            self.operations.lock().unwrap().push(RecordedOp::Rotate {
                input: input.clone(),
                degrees: params.degrees,
            });
            self.reply(1, 1, Quality::default())
        }
    }

    #[test]
    fn mock_records_resize() {
        let engine = MockEngine::new();

        let output = engine
            .resize(
                &EngineInput::Path("/images/source.jpg".into()),
                &ResizeParams {
                    width: 800,
                    height: 600,
                    quality: Quality::new(90).unwrap(),
                    format: Some("png".into()),
                    autocrop: false,
                },
            )
            .unwrap();
        assert_eq!(output.info.width, 800);
        assert_eq!(output.info.quality, Some(90));

        let ops = engine.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize {
                width: 800,
                height: 600,
                quality: 90,
                format: Some(f),
                ..
            } if f == "png"
        ));
    }

    #[test]
    fn mock_failure_is_reported_and_still_recorded() {
        let engine = MockEngine::failing("corrupt image");

        let err = engine
            .thumbnail(
                &EngineInput::Buffer(vec![1, 2, 3]),
                &ThumbnailParams {
                    width: 10,
                    height: 10,
                    quality: Quality::default(),
                    autocrop: true,
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Processing failed: corrupt image");
        assert_eq!(engine.get_operations().len(), 1);
    }
}
