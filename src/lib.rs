//! # wandgate
//!
//! A validation and dispatch gate for image resizing. Callers hand in an
//! untrusted source (a file path or a byte buffer) and a loosely-typed
//! options set; the gate proves both are safe and well-formed, normalizes
//! them, enforces a dimension ceiling, and only then forwards the request to
//! an image engine. Whatever the engine returns, or whatever went wrong
//! before it was called, comes back through one callback.
//!
//! ```no_run
//! use wandgate::{Gate, ImageOptions, RustEngine};
//!
//! let gate = Gate::new(RustEngine::new());
//! gate.resize("photo.jpg", ImageOptions::new().width(100).height(100), |result| {
//!     match result {
//!         Ok(output) => println!("{}x{}", output.info.width, output.info.height),
//!         Err(err) => eprintln!("{}: {err}", err.kind()),
//!     }
//! })?;
//! # Ok::<(), wandgate::WandError>(())
//! ```
//!
//! # Pipeline
//!
//! ```text
//! options ─► normalize ─► validate path ─► enforce limits ─► engine ─► callback
//! ```
//!
//! Buffers skip path validation. Any stage may stop the request early.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gate`] | [`Gate`]: the public operations, dispatch, and error routing |
//! | [`gate::options`] | Defaulting and range checks for caller options |
//! | [`gate::path`] | [`ImageSource`] and path validation |
//! | [`gate::limits`] | The dimension ceiling |
//! | [`imaging`] | [`ImageEngine`] trait and the bundled [`RustEngine`] |
//! | [`error`] | [`WandError`], [`ErrorKind`], and the [`Delivery`] policy |
//! | [`config`] | TOML configuration for process-wide defaults |
//! | [`logging`] | `tracing` subscriber setup for binaries |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Two Delivery Lanes
//!
//! Errors are split by what they say about the caller. A malformed options
//! set is a bug at the call site, so it is returned immediately from the
//! operation where a surrounding `?` sees it. A missing file, an unreadable
//! file, or an oversized request is a fact about the world, so it always
//! arrives through the callback on a worker thread, even though the gate
//! noticed it before scheduling anything. A caller never sees the same
//! failure class delivered synchronously on one call and asynchronously on
//! another. The lane belongs to the error variant ([`WandError::delivery`]),
//! not to the order in which checks happen to run.
//!
//! ## Typed Options
//!
//! [`ImageOptions`] has one optional field per recognized key, and
//! [`gate::options::normalize`] applies an explicit default to each. The
//! wire form stays lenient (numeric strings, `null`, truthy `autocrop`) but
//! that leniency lives in the deserializer, field by field, rather than in
//! blanket truthiness checks.
//!
//! ## Quality Zero
//!
//! A quality of `0` means "engine default", and an explicit `0` is
//! indistinguishable from leaving it out. Callers cannot ask for a literal
//! quality of zero.
//!
//! ## One Call Site Into the Engine
//!
//! Every engine call goes through a single dispatch function that receives
//! only validated values. Engines never see caller strings: paths arrive
//! canonical and absolute, and parameters arrive range-checked.

pub mod config;
pub mod error;
pub mod gate;
pub mod imaging;
pub mod logging;
pub mod output;

pub use error::{Delivery, ErrorKind, WandError};
pub use gate::Gate;
pub use gate::options::{DEFAULT_MAX_DIMENSION, ImageOptions, NormalizedParams};
pub use gate::path::{ImageSource, ValidatedPath};
pub use imaging::{ImageEngine, ImageInfo, ImageOutput, RustEngine};

#[cfg(test)]
pub(crate) mod test_helpers;
