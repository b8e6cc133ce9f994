//! Shared test utilities.
//!
//! Synthetic fixtures (small JPEG/PNG images generated on the fly) and a
//! helper that turns the gate's callback into something a test can block on.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! create_test_jpeg(&path, 200, 150);
//!
//! let (callback, rx) = capture();
//! gate.resize(path, options, callback).unwrap();
//! let delivery = wait_for(&rx);
//! ```

use crate::error::WandError;
use crate::imaging::ImageOutput;
use image::{ImageEncoder, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::mpsc::{Receiver, channel};
use std::thread::{self, ThreadId};
use std::time::Duration;

// =========================================================================
// Fixture setup
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a gradient of the given size as JPEG bytes.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf.into_inner()
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Create a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

// =========================================================================
// Callback capture
// =========================================================================

/// One callback invocation: what was delivered and which thread delivered it.
pub type Delivered = (Result<ImageOutput, WandError>, ThreadId);

/// A callback that forwards its result (and the invoking thread) to a channel.
pub fn capture() -> (
    impl FnOnce(Result<ImageOutput, WandError>) + Send + 'static,
    Receiver<Delivered>,
) {
    let (tx, rx) = channel();
    let callback = move |result: Result<ImageOutput, WandError>| {
        tx.send((result, thread::current().id())).ok();
    };
    (callback, rx)
}

/// Block until the callback fires. Panics after ten seconds.
pub fn wait_for(rx: &Receiver<Delivered>) -> Delivered {
    rx.recv_timeout(Duration::from_secs(10))
        .expect("callback was never invoked")
}

/// Assert the callback is never invoked (its sender was dropped unused).
pub fn assert_never_called(rx: &Receiver<Delivered>) {
    assert!(
        rx.recv_timeout(Duration::from_millis(200)).is_err(),
        "callback was invoked"
    );
}
