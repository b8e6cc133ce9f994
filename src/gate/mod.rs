//! The validation and dispatch gate.
//!
//! [`Gate`] is the public face of the crate. Each operation runs the same
//! pipeline:
//!
//! ```text
//! options ─► normalize ─► validate path ─► enforce limits ─► dispatch ─► callback
//!               │              │                 │               │
//!               └──────────────┴─────────────────┴───────────────┴─► translate
//! ```
//!
//! Any stage can short-circuit to the translator, which applies the
//! [`Delivery`] policy of the error: options defects come back as the
//! operation's `Err`, everything else reaches the callback on a rayon worker
//! thread. The callback therefore runs exactly once per accepted request,
//! and never on the caller's thread.
//!
//! The gate holds no mutable state. Its only configuration, the default
//! dimension ceiling, is fixed at construction.

pub mod limits;
pub mod options;
pub mod path;

use crate::config::GateConfig;
use crate::error::{Delivery, WandError};
use crate::imaging::{
    EngineError, EngineInput, ImageEngine, ImageOutput, ResizeParams, RotateParams,
    ThumbnailParams,
};
use limits::enforce_limits;
use options::{
    DEFAULT_MAX_DIMENSION, ImageOptions, NormalizedParams, Operation, normalize,
    normalize_rotation,
};
use path::ImageSource;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A fully validated engine call.
#[derive(Debug, Clone, PartialEq)]
enum Request {
    Resize(ResizeParams),
    Thumbnail(ThumbnailParams),
    Rotate(RotateParams),
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Resize(_) => f.write_str("resize"),
            Request::Thumbnail(_) => f.write_str("thumbnail"),
            Request::Rotate(_) => f.write_str("rotate"),
        }
    }
}

/// Validates requests and forwards them to an [`ImageEngine`].
pub struct Gate<E> {
    engine: Arc<E>,
    default_max_dimension: u32,
}

impl<E> Clone for Gate<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            default_max_dimension: self.default_max_dimension,
        }
    }
}

impl<E: ImageEngine + 'static> Gate<E> {
    /// Gate with the stock ceiling of [`DEFAULT_MAX_DIMENSION`].
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
            default_max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    pub fn with_config(engine: E, config: &GateConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            default_max_dimension: config.limits.max_dimension,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn default_max_dimension(&self) -> u32 {
        self.default_max_dimension
    }

    /// Resize an image.
    ///
    /// Returns `Err` only for malformed options (empty set, negative
    /// dimensions, quality outside 0-100); `callback` is then dropped
    /// without being called. Every other outcome, success or failure,
    /// arrives through `callback`.
    pub fn resize<F>(
        &self,
        source: impl Into<ImageSource>,
        options: ImageOptions,
        callback: F,
    ) -> Result<(), WandError>
    where
        F: FnOnce(Result<ImageOutput, WandError>) + Send + 'static,
    {
        let staged = normalize(Operation::Resize, Some(&options), self.default_max_dimension)
            .and_then(|params| {
                let input = admit(source.into(), &params)?;
                Ok((input, Request::Resize(params.to_resize_params())))
            });
        self.submit(staged, callback)
    }

    /// Thumbnail an image. `None` options means all defaults.
    ///
    /// Same delivery contract as [`Gate::resize`]. A `format` option is
    /// ignored: thumbnails keep the source format.
    pub fn thumbnail<F>(
        &self,
        source: impl Into<ImageSource>,
        options: Option<ImageOptions>,
        callback: F,
    ) -> Result<(), WandError>
    where
        F: FnOnce(Result<ImageOutput, WandError>) + Send + 'static,
    {
        let staged = normalize(
            Operation::Thumbnail,
            options.as_ref(),
            self.default_max_dimension,
        )
        .and_then(|params| {
            let input = admit(source.into(), &params)?;
            Ok((input, Request::Thumbnail(params.to_thumbnail_params())))
        });
        self.submit(staged, callback)
    }

    /// Rotate an image clockwise by `degrees`.
    ///
    /// Returns `Err` only for a non-finite angle. There is no dimension
    /// request, so no ceiling applies.
    pub fn rotate<F>(
        &self,
        source: impl Into<ImageSource>,
        degrees: f64,
        callback: F,
    ) -> Result<(), WandError>
    where
        F: FnOnce(Result<ImageOutput, WandError>) + Send + 'static,
    {
        let staged = normalize_rotation(degrees).and_then(|params| {
            let input = source.into().into_engine_input()?;
            Ok((input, Request::Rotate(params)))
        });
        self.submit(staged, callback)
    }

    fn submit<F>(
        &self,
        staged: Result<(EngineInput, Request), WandError>,
        callback: F,
    ) -> Result<(), WandError>
    where
        F: FnOnce(Result<ImageOutput, WandError>) + Send + 'static,
    {
        match staged {
            Ok((input, request)) => {
                self.dispatch(input, request, callback);
                Ok(())
            }
            Err(err) => translate(err, callback),
        }
    }

    /// The single call site into the engine. Runs on a rayon worker.
    fn dispatch<F>(&self, input: EngineInput, request: Request, callback: F)
    where
        F: FnOnce(Result<ImageOutput, WandError>) + Send + 'static,
    {
        debug!(operation = %request, source = %describe(&input), "dispatching to engine");
        let engine = Arc::clone(&self.engine);
        rayon::spawn(move || {
            let result = run(engine.as_ref(), &input, &request).map_err(WandError::from);
            if let Err(err) = &result {
                warn!(operation = %request, error = %err, "engine failed");
            }
            callback(result);
        });
    }
}

/// Path validation, then the ceiling check.
fn admit(source: ImageSource, params: &NormalizedParams) -> Result<EngineInput, WandError> {
    let input = source.into_engine_input()?;
    enforce_limits(params)?;
    Ok(input)
}

fn run<E: ImageEngine + ?Sized>(
    engine: &E,
    input: &EngineInput,
    request: &Request,
) -> Result<ImageOutput, EngineError> {
    match request {
        Request::Resize(params) => engine.resize(input, params),
        Request::Thumbnail(params) => engine.thumbnail(input, params),
        Request::Rotate(params) => engine.rotate(input, params),
    }
}

/// Route a pre-dispatch failure to its delivery lane.
fn translate<F>(err: WandError, callback: F) -> Result<(), WandError>
where
    F: FnOnce(Result<ImageOutput, WandError>) + Send + 'static,
{
    match err.delivery() {
        Delivery::Immediate => {
            debug!(kind = %err.kind(), error = %err, "rejected request");
            Err(err)
        }
        Delivery::Deferred => {
            debug!(kind = %err.kind(), error = %err, "rejected request, deferring to callback");
            rayon::spawn(move || callback(Err(err)));
            Ok(())
        }
    }
}

/// Log label for an engine input; base name only for paths.
fn describe(input: &EngineInput) -> String {
    match input {
        EngineInput::Path(p) => path::display_name(p),
        EngineInput::Buffer(bytes) => format!("buffer ({} bytes)", bytes.len()),
    }
}
