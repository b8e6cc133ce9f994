//! Image processing: the engine seam and the bundled engine.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Resize** | `resize_exact` (Lanczos3), optional autocrop and format conversion |
//! | **Thumbnail** | `thumbnail_exact`, optional autocrop, source format kept |
//! | **Rotate** | right-angle `rotate90` / `rotate180` / `rotate270` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for output geometry (unit testable)
//! - **Parameters**: Data structures describing engine operations
//! - **Engine**: [`ImageEngine`] trait + [`RustEngine`]

pub mod calculations;
pub mod engine;
mod params;
pub mod rust_engine;

pub use engine::{EngineError, EngineInput, ImageEngine, ImageInfo, ImageOutput};
pub use params::{Quality, ResizeParams, RotateParams, ThumbnailParams};
pub use rust_engine::RustEngine;
